pub mod allocator;
pub mod blobs;
pub mod lane_counter;
pub mod raster;

pub use allocator::{
    allocate, AllocatorKind, CongestionMultipliers, GlobalFactorAllocator, GlobalFactorParams,
    ProportionalAllocator, SignalTimingAllocator, TimingParams,
};
pub use blobs::{extract_blobs, Blob};
pub use lane_counter::{CounterConfig, LaneCounter};
pub use raster::decode_image;
