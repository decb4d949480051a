use crate::interface::CountVector;
use crate::prelude::TrafficError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CongestionLabel {
    Low,
    Medium,
    High,
}

impl CongestionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLabel::Low => "low",
            CongestionLabel::Medium => "medium",
            CongestionLabel::High => "high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CongestionLabel::Low => "Low Congestion",
            CongestionLabel::Medium => "Medium Congestion",
            CongestionLabel::High => "High Congestion",
        }
    }
}

impl fmt::Display for CongestionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CongestionLabel {
    type Err = TrafficError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let level = normalized
            .strip_suffix(" congestion")
            .unwrap_or(&normalized);
        match level {
            "low" => Ok(CongestionLabel::Low),
            "med" | "medium" => Ok(CongestionLabel::Medium),
            "high" => Ok(CongestionLabel::High),
            _ => Err(TrafficError::UnknownValue(format!(
                "congestion label '{}'",
                value
            ))),
        }
    }
}

impl TryFrom<String> for CongestionLabel {
    type Error = TrafficError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Maps lane counts to a congestion label.
pub trait CongestionClassifier {
    fn classify(&self, counts: &CountVector) -> CongestionLabel;
}

impl<F> CongestionClassifier for F
where
    F: Fn(&CountVector) -> CongestionLabel,
{
    fn classify(&self, counts: &CountVector) -> CongestionLabel {
        self(counts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdClassifier {
    pub low_max: u64,
    pub medium_max: u64,
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self {
            low_max: 10,
            medium_max: 20,
        }
    }
}

impl CongestionClassifier for ThresholdClassifier {
    fn classify(&self, counts: &CountVector) -> CongestionLabel {
        let total = counts.total();
        if total <= self.low_max {
            CongestionLabel::Low
        } else if total <= self.medium_max {
            CongestionLabel::Medium
        } else {
            CongestionLabel::High
        }
    }
}
