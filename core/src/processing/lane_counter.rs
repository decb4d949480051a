use crate::interface::{CountVector, LaneGeometry};
use crate::prelude::TrafficResult;
use crate::processing::blobs::{extract_regions, Blob};
use crate::processing::raster::{
    binarize, decode_image, ensure_non_empty, to_intensity, DEFAULT_THRESHOLD,
};
use crate::telemetry::log::LogManager;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Reference minimum blob area (px²) for the noise-filtered counter.
pub const DEFAULT_MIN_BLOB_AREA: f64 = 100.0;

/// Tunables for [`LaneCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Foreground is intensity strictly above this value.
    pub threshold: u8,
    /// Blobs smaller than this are noise; `None` disables the filter.
    pub min_blob_area: Option<f64>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_blob_area: Some(DEFAULT_MIN_BLOB_AREA),
        }
    }
}

/// Counts bright blobs per fixed-width lane of a road-scene raster.
///
/// The counter assumes vehicles render brighter than a uniform dark road and
/// that lanes are vertical slices of equal width. It keeps no state between
/// calls.
#[derive(Debug, Clone, Copy)]
pub struct LaneCounter {
    config: CounterConfig,
    logger: LogManager,
}

impl Default for LaneCounter {
    fn default() -> Self {
        Self::new(CounterConfig::default())
    }
}

impl LaneCounter {
    pub fn new(config: CounterConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("trafficcore::counter"),
        }
    }

    /// Counter without the minimum-area noise filter.
    pub fn unfiltered() -> Self {
        Self::new(CounterConfig {
            min_blob_area: None,
            ..CounterConfig::default()
        })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Vehicles per lane in `image`.
    pub fn count(&self, image: &RgbImage, geometry: &LaneGeometry) -> TrafficResult<CountVector> {
        geometry.validate()?;
        let blobs = self.detect_blobs(image)?;
        let counts = self.bucket(&blobs, geometry);
        self.logger.record(&format!(
            "LaneCounter {} blobs -> counts {}",
            blobs.len(),
            counts
        ));
        Ok(counts)
    }

    /// Same as [`count`](Self::count) for an encoded (PNG/JPEG/BMP) buffer.
    pub fn count_encoded(&self, bytes: &[u8], geometry: &LaneGeometry) -> TrafficResult<CountVector> {
        geometry.validate()?;
        let image = decode_image(bytes)?;
        self.count(&image, geometry)
    }

    /// Assigns already-extracted blobs to lanes, applying the noise filter.
    pub fn count_blobs(&self, blobs: &[Blob], geometry: &LaneGeometry) -> TrafficResult<CountVector> {
        geometry.validate()?;
        Ok(self.bucket(blobs, geometry))
    }

    /// External blobs with non-zero area, before noise filtering.
    pub fn detect_blobs(&self, image: &RgbImage) -> TrafficResult<Vec<Blob>> {
        ensure_non_empty(image)?;
        let mask = binarize(&to_intensity(image), self.config.threshold);
        let regions = extract_regions(&mask);
        let total = regions.len();
        let blobs: Vec<Blob> = regions.iter().filter_map(Blob::from_moments).collect();
        if blobs.len() < total {
            self.logger.detail(&format!(
                "dropped {} degenerate regions",
                total - blobs.len()
            ));
        }
        Ok(blobs)
    }

    fn bucket(&self, blobs: &[Blob], geometry: &LaneGeometry) -> CountVector {
        let mut counts = CountVector::zeros(geometry.lane_count);
        for blob in blobs {
            if !self.passes_noise_filter(blob) {
                self.logger.detail(&format!(
                    "noise blob area {:.1} at x {:.1}",
                    blob.area, blob.centroid_x
                ));
                continue;
            }
            counts.increment(geometry.lane_index(blob.centroid_x));
        }
        counts
    }

    fn passes_noise_filter(&self, blob: &Blob) -> bool {
        self.config
            .min_blob_area
            .map_or(true, |min_area| blob.area >= min_area)
    }
}
