use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trafficcore::prelude::{
    AllocatorKind, CounterConfig, LaneGeometry, ThresholdClassifier, TimingParams,
};

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub lane_count: usize,
    pub lane_width: f64,
    /// Defaults to `lane_count * lane_width`.
    #[serde(default)]
    pub image_width: Option<f64>,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub timing: TimingParams,
    #[serde(default)]
    pub classifier: ThresholdClassifier,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        lane_count: usize,
        lane_width: f64,
        counter: CounterConfig,
        strategy: AllocatorKind,
    ) -> Self {
        Self {
            lane_count,
            lane_width,
            image_width: None,
            counter,
            timing: TimingParams::default()
                .with_lane_count(lane_count)
                .with_strategy(strategy),
            classifier: ThresholdClassifier::default(),
            data_dir: default_data_dir(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn to_geometry(&self) -> LaneGeometry {
        let geometry = LaneGeometry::new(self.lane_count, self.lane_width);
        match self.image_width {
            Some(width) => geometry.with_image_width(width),
            None => geometry,
        }
    }

    /// Timing parameters with the lane count pinned to the geometry.
    pub fn timing_params(&self) -> TimingParams {
        self.timing.clone().with_lane_count(self.lane_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_geometry() {
        let cfg = WorkflowConfig::from_args(
            3,
            150.0,
            CounterConfig::default(),
            AllocatorKind::GlobalFactor,
        );
        assert_eq!(cfg.to_geometry().image_width, 450.0);
        assert_eq!(cfg.timing_params().lane_count, 3);
        assert_eq!(cfg.timing_params().strategy, AllocatorKind::GlobalFactor);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"lane_count: 2\nlane_width: 320\nimage_width: 700\ncounter:\n  threshold: 140\ntiming:\n  base_green_budget: 40\n  strategy: global_factor\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.lane_count, 2);
        assert_eq!(cfg.to_geometry().image_width, 700.0);
        assert_eq!(cfg.counter.threshold, 140);
        assert_eq!(cfg.counter.min_blob_area, Some(100.0));
        assert_eq!(cfg.timing.base_green_budget, 40);
        assert_eq!(cfg.timing.yellow, 5);
        assert_eq!(cfg.timing_params().lane_count, 2);
        assert_eq!(cfg.timing.strategy, AllocatorKind::GlobalFactor);
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("reading workflow config"));
    }
}
