pub use crate::interface::{
    CongestionClassifier, CongestionLabel, CountVector, LaneGeometry, LaneTiming,
    ThresholdClassifier, TimingPlan,
};
pub use crate::processing::{
    allocate, AllocatorKind, Blob, CounterConfig, LaneCounter, SignalTimingAllocator,
    TimingParams,
};

/// Common error type for counting and allocation.
///
/// Every variant carries the offending value so a caller can log it and abort
/// the single request; nothing in the core retries.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrafficError {
    #[error("image read failure: {0}")]
    ImageRead(String),
    #[error("invalid lane geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid counts: {0}")]
    InvalidCounts(String),
    #[error("invalid timing parameters: {0}")]
    InvalidParams(String),
    #[error("unknown value: {0}")]
    UnknownValue(String),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
