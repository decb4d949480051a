//! External contours of a binary mask and their blob statistics.
//!
//! Only top-level outer borders are kept, so anything inside a blob's hole
//! belongs to the enclosing blob.

use crate::math::moments::RawMoments;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use serde::{Deserialize, Serialize};

/// A candidate vehicle: one external foreground contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub centroid_x: f64,
    pub centroid_y: f64,
    pub area: f64,
}

impl Blob {
    /// `None` when the contour encloses no area.
    pub fn from_moments(moments: &RawMoments) -> Option<Self> {
        let (centroid_x, centroid_y) = moments.centroid()?;
        Some(Self {
            centroid_x,
            centroid_y,
            area: moments.area(),
        })
    }
}

fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Moments of every external contour of `mask` (non-zero is foreground).
pub fn extract_regions(mask: &GrayImage) -> Vec<RawMoments> {
    find_contours::<i32>(mask)
        .iter()
        .filter(|contour| is_external(contour))
        .map(|contour| {
            let polygon: Vec<(f64, f64)> = contour
                .points
                .iter()
                .map(|p| (f64::from(p.x), f64::from(p.y)))
                .collect();
            RawMoments::from_polygon(&polygon)
        })
        .collect()
}

/// Blobs with a usable centroid; degenerate contours are dropped.
pub fn extract_blobs(mask: &GrayImage) -> Vec<Blob> {
    extract_regions(mask)
        .iter()
        .filter_map(Blob::from_moments)
        .collect()
}
