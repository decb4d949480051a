use serde::{Deserialize, Serialize};

/// Phase durations for one lane, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneTiming {
    pub green: u32,
    pub yellow: u32,
    pub red: u32,
}

impl LaneTiming {
    /// Widened so arbitrary durations cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.green) + u64::from(self.yellow) + u64::from(self.red)
    }
}

/// Per-lane timings sharing one cycle length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPlan {
    pub per_lane: Vec<LaneTiming>,
    pub cycle_length: u32,
}

impl TimingPlan {
    pub fn lane_count(&self) -> usize {
        self.per_lane.len()
    }

    /// True when every lane's green + yellow + red equals the cycle length.
    pub fn is_consistent(&self) -> bool {
        self.per_lane
            .iter()
            .all(|lane| lane.total() == u64::from(self.cycle_length))
    }
}
