use crate::prelude::{TrafficError, TrafficResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicles observed per lane, indexed `0..lane_count`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountVector(Vec<u32>);

impl CountVector {
    pub fn zeros(lane_count: usize) -> Self {
        Self(vec![0; lane_count])
    }

    pub fn lanes(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&count| u64::from(count)).sum()
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }

    pub(crate) fn increment(&mut self, lane: usize) {
        if let Some(slot) = self.0.get_mut(lane) {
            *slot += 1;
        }
    }
}

impl From<Vec<u32>> for CountVector {
    fn from(counts: Vec<u32>) -> Self {
        Self(counts)
    }
}

/// Signed counts arrive from wire payloads; negatives are rejected here.
impl TryFrom<Vec<i64>> for CountVector {
    type Error = TrafficError;

    fn try_from(raw: Vec<i64>) -> TrafficResult<Self> {
        raw.into_iter()
            .enumerate()
            .map(|(lane, value)| {
                u32::try_from(value).map_err(|_| {
                    TrafficError::InvalidCounts(format!(
                        "lane {} has out-of-range count {}",
                        lane, value
                    ))
                })
            })
            .collect::<TrafficResult<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for CountVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_all_lanes() {
        let counts = CountVector::from(vec![2, 8, 0, 5]);
        assert_eq!(counts.total(), 15);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.to_string(), "[2, 8, 0, 5]");
    }

    #[test]
    fn negative_wire_counts_rejected() {
        let err = CountVector::try_from(vec![3_i64, -1, 0]).unwrap_err();
        assert_eq!(
            err,
            TrafficError::InvalidCounts("lane 1 has out-of-range count -1".into())
        );
    }

    #[test]
    fn increment_ignores_unknown_lane() {
        let mut counts = CountVector::zeros(2);
        counts.increment(1);
        counts.increment(7);
        assert_eq!(counts.lanes(), &[0, 1]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let counts = CountVector::from(vec![1, 0, 4]);
        assert_eq!(serde_json::to_string(&counts).unwrap(), "[1,0,4]");
    }
}
