pub mod congestion;
pub mod counts;
pub mod geometry;
pub mod timing;

pub use congestion::{CongestionClassifier, CongestionLabel, ThresholdClassifier};
pub use counts::CountVector;
pub use geometry::LaneGeometry;
pub use timing::{LaneTiming, TimingPlan};
