use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trafficcore::prelude::{
    allocate, CongestionClassifier, CongestionLabel, CountVector, LaneCounter, TimingPlan,
    TrafficResult,
};
use trafficcore::processing::decode_image;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    pub counts: CountVector,
    pub prediction: CongestionLabel,
    pub timings: TimingPlan,
}

/// Runs count -> classify -> allocate for one image at a time.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    counter: LaneCounter,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let counter = LaneCounter::new(config.counter);
        Self { config, counter }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn analyze(&self, image: &RgbImage) -> anyhow::Result<AnalysisResult> {
        self.analyze_with(image, &self.config.classifier)
    }

    /// Like [`analyze`](Self::analyze) with a caller-supplied classifier.
    pub fn analyze_with<C: CongestionClassifier + ?Sized>(
        &self,
        image: &RgbImage,
        classifier: &C,
    ) -> anyhow::Result<AnalysisResult> {
        let counts = self
            .counter
            .count(image, &self.config.to_geometry())
            .context("counting vehicles per lane")?;
        let prediction = classifier.classify(&counts);
        let timings = self
            .allocate(&counts, prediction)
            .context("allocating signal timings")?;

        Ok(AnalysisResult {
            image_path: None,
            counts,
            prediction,
            timings,
        })
    }

    pub fn analyze_path(&self, path: &Path) -> anyhow::Result<AnalysisResult> {
        let bytes =
            fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
        let image =
            decode_image(&bytes).with_context(|| format!("decoding image {}", path.display()))?;
        let mut result = self
            .analyze(&image)
            .with_context(|| format!("analyzing {}", path.display()))?;
        result.image_path = Some(path.to_path_buf());
        Ok(result)
    }

    pub fn allocate(
        &self,
        counts: &CountVector,
        label: CongestionLabel,
    ) -> TrafficResult<TimingPlan> {
        allocate(counts, label, &self.config.timing_params())
    }

    /// Image file names in the data directory, sorted.
    pub fn list_images(&self) -> anyhow::Result<Vec<String>> {
        let dir = &self.config.data_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut images = Vec::new();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("listing data directory {}", dir.display()))?
        {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                images.push(name.to_string());
            }
        }
        images.sort();
        Ok(images)
    }

    /// The last image by name in the data directory.
    pub fn latest_image(&self) -> anyhow::Result<PathBuf> {
        let images = self.list_images()?;
        let name = images.last().with_context(|| {
            format!("no images found in {}", self.config.data_dir.display())
        })?;
        Ok(self.config.data_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::scene::{build_scene, write_scenes, SceneConfig};
    use trafficcore::prelude::{AllocatorKind, CounterConfig};

    fn runner() -> Runner {
        Runner::new(WorkflowConfig::from_args(
            4,
            200.0,
            CounterConfig::default(),
            AllocatorKind::Proportional,
        ))
    }

    #[test]
    fn runner_executes_workflow() {
        let scene = build_scene(&SceneConfig {
            seed: 3,
            ..SceneConfig::default()
        })
        .unwrap();
        let result = runner().analyze(&scene.image).unwrap();
        assert_eq!(result.counts, scene.true_counts);
        assert_eq!(result.timings.lane_count(), 4);
        assert!(result.timings.is_consistent());
        assert!(result.prediction <= CongestionLabel::Medium);
    }

    #[test]
    fn injected_classifier_drives_allocation() {
        let scene = build_scene(&SceneConfig::default()).unwrap();
        let always_high = |_: &CountVector| CongestionLabel::High;
        let result = runner().analyze_with(&scene.image, &always_high).unwrap();
        assert_eq!(result.prediction, CongestionLabel::High);
        assert_eq!(result.timings.cycle_length, 85);
    }

    #[test]
    fn mismatched_geometry_surfaces_context() {
        let runner = Runner::new(WorkflowConfig::from_args(
            0,
            200.0,
            CounterConfig::default(),
            AllocatorKind::Proportional,
        ));
        let scene = build_scene(&SceneConfig::default()).unwrap();
        let err = runner.analyze(&scene.image).unwrap_err();
        assert!(format!("{:#}", err).contains("counting vehicles per lane"));
    }

    #[test]
    fn latest_image_picks_last_name() {
        let dir = tempfile::tempdir().unwrap();
        write_scenes(&SceneConfig::default(), 3, dir.path()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
        let runner = Runner::new(runner().config().clone().with_data_dir(dir.path().into()));

        assert_eq!(runner.list_images().unwrap().len(), 3);
        let latest = runner.latest_image().unwrap();
        assert!(latest.ends_with("traffic_0002.png"));

        let result = runner.analyze_path(&latest).unwrap();
        assert_eq!(result.image_path.as_deref(), Some(latest.as_path()));
    }

    #[test]
    fn unreadable_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = runner().analyze_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("decoding image"));
    }
}
