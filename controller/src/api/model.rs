use serde::{Deserialize, Serialize};
use trafficcore::CongestionLabel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Counts arrive signed so negatives can be reported instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateRequest {
    pub counts: Vec<i64>,
    pub label: CongestionLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageList {
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
