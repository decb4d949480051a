//! Lane-density estimation and signal-timing allocation core.
//!
//! Two pure stages are consumed in sequence by a caller: the
//! [`LaneCounter`](processing::LaneCounter) turns a road-scene raster into a
//! per-lane vehicle count, and a
//! [`SignalTimingAllocator`](processing::SignalTimingAllocator) turns those
//! counts plus a congestion label into a green/yellow/red timing plan.
//! Classification of the counts is an injected capability, see
//! [`interface::congestion`].

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    allocate, CongestionLabel, CountVector, LaneCounter, LaneGeometry, LaneTiming, TimingParams,
    TimingPlan, TrafficError, TrafficResult,
};
