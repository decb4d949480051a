use crate::prelude::{TrafficError, TrafficResult};
use serde::{Deserialize, Serialize};

/// Fixed-width vertical lanes laid across the x-axis of an axis-aligned image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneGeometry {
    pub lane_count: usize,
    pub lane_width: f64,
    pub image_width: f64,
}

impl LaneGeometry {
    /// Geometry following the usual convention `image_width == lane_count * lane_width`.
    pub fn new(lane_count: usize, lane_width: f64) -> Self {
        Self {
            lane_count,
            lane_width,
            image_width: lane_count as f64 * lane_width,
        }
    }

    /// Overrides the image width; pixels past the last lane boundary clip to the last lane.
    pub fn with_image_width(mut self, image_width: f64) -> Self {
        self.image_width = image_width;
        self
    }

    pub fn validate(&self) -> TrafficResult<()> {
        if self.lane_count == 0 {
            return Err(TrafficError::InvalidGeometry(
                "lane_count must be positive, got 0".into(),
            ));
        }
        if !self.lane_width.is_finite() || self.lane_width <= 0.0 {
            return Err(TrafficError::InvalidGeometry(format!(
                "lane_width must be positive, got {}",
                self.lane_width
            )));
        }
        if !self.image_width.is_finite() || self.image_width <= 0.0 {
            return Err(TrafficError::InvalidGeometry(format!(
                "image_width must be positive, got {}",
                self.image_width
            )));
        }
        Ok(())
    }

    /// Lane bucket for a horizontal position: `min(floor(x / lane_width), lane_count - 1)`.
    pub fn lane_index(&self, x: f64) -> usize {
        let last = self.lane_count.saturating_sub(1);
        let bucket = (x / self.lane_width).floor();
        if bucket.is_nan() || bucket <= 0.0 {
            0
        } else if bucket >= last as f64 {
            last
        } else {
            bucket as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_geometry_spans_all_lanes() {
        let geometry = LaneGeometry::new(4, 200.0);
        assert_eq!(geometry.image_width, 800.0);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn zero_lanes_rejected() {
        let err = LaneGeometry::new(0, 200.0).validate().unwrap_err();
        assert!(matches!(err, TrafficError::InvalidGeometry(_)));
    }

    #[test]
    fn non_positive_lane_width_rejected() {
        for width in [0.0, -5.0, f64::NAN] {
            let err = LaneGeometry::new(3, width)
                .with_image_width(600.0)
                .validate()
                .unwrap_err();
            assert!(matches!(err, TrafficError::InvalidGeometry(_)));
        }
    }

    #[test]
    fn lane_boundary_belongs_to_upper_lane() {
        let geometry = LaneGeometry::new(4, 200.0);
        assert_eq!(geometry.lane_index(199.999), 0);
        assert_eq!(geometry.lane_index(200.0), 1);
        assert_eq!(geometry.lane_index(400.0), 2);
    }

    #[test]
    fn overflow_positions_clip_to_last_lane() {
        let geometry = LaneGeometry::new(4, 200.0).with_image_width(1000.0);
        assert_eq!(geometry.lane_index(600.0), 3);
        assert_eq!(geometry.lane_index(950.0), 3);
        assert_eq!(geometry.lane_index(1.0e9), 3);
    }
}
