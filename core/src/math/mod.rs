pub mod moments;

pub use moments::RawMoments;
