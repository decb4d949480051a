use anyhow::{bail, Context};
use image::{Rgb, RgbImage};
use log::info;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trafficcore::CountVector;

const ROAD_INTENSITY: u8 = 50;
const MARKING_THICKNESS: u32 = 2;
const LANE_MARGIN: u32 = 20;
const VEHICLE_WIDTH: (u32, u32) = (40, 60);
const VEHICLE_HEIGHT: (u32, u32) = (80, 120);
const SLOT_GAP: u32 = 10;
const VEHICLE_CHANNEL_MIN: u8 = 160;

/// Configuration for generating synthetic road scenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub lane_count: usize,
    pub lane_width: u32,
    pub height: u32,
    pub max_vehicles_per_lane: usize,
    /// Gray level of the lane markings; keep it at or below the counter threshold.
    pub marking_intensity: u8,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            lane_count: 4,
            lane_width: 200,
            height: 600,
            max_vehicles_per_lane: 4,
            marking_intensity: 100,
            seed: 0,
        }
    }
}

impl SceneConfig {
    fn slot_height(&self) -> u32 {
        VEHICLE_HEIGHT.1 + SLOT_GAP
    }

    /// Vertical slots per lane; one vehicle per slot keeps vehicles apart.
    fn slot_count(&self) -> u32 {
        self.height / self.slot_height()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.lane_count == 0 {
            bail!("scene needs at least one lane");
        }
        if self.lane_width < VEHICLE_WIDTH.1 + 2 * LANE_MARGIN {
            bail!(
                "lane width {} too narrow for {} px vehicles",
                self.lane_width,
                VEHICLE_WIDTH.1
            );
        }
        if self.slot_count() == 0 {
            bail!(
                "scene height {} shorter than one vehicle slot ({} px)",
                self.height,
                self.slot_height()
            );
        }
        Ok(())
    }
}

/// A generated frame together with the number of vehicles drawn per lane.
pub struct Scene {
    pub image: RgbImage,
    pub true_counts: CountVector,
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for row in y..(y + height).min(image.height()) {
        for col in x..(x + width).min(image.width()) {
            image.put_pixel(col, row, color);
        }
    }
}

pub fn build_scene(config: &SceneConfig) -> anyhow::Result<Scene> {
    config.validate()?;
    let lane_count = u32::try_from(config.lane_count).context("lane count exceeds u32")?;
    let width = lane_count
        .checked_mul(config.lane_width)
        .context("overflow computing scene width")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut image = RgbImage::from_pixel(
        width,
        config.height,
        Rgb([ROAD_INTENSITY, ROAD_INTENSITY, ROAD_INTENSITY]),
    );

    let marking = Rgb([config.marking_intensity; 3]);
    for lane in 1..lane_count {
        let x = lane * config.lane_width - MARKING_THICKNESS / 2;
        fill_rect(&mut image, x, 0, MARKING_THICKNESS, config.height, marking);
    }

    let slot_height = config.slot_height();
    let mut slots: Vec<u32> = (0..config.slot_count()).collect();
    let cap = config.max_vehicles_per_lane.min(slots.len());
    let mut true_counts = Vec::with_capacity(config.lane_count);

    for lane in 0..lane_count {
        let vehicles = rng.gen_range(0..=cap);
        slots.shuffle(&mut rng);
        for &slot in &slots[..vehicles] {
            let w = rng.gen_range(VEHICLE_WIDTH.0..=VEHICLE_WIDTH.1);
            let h = rng.gen_range(VEHICLE_HEIGHT.0..=VEHICLE_HEIGHT.1);
            let x = lane * config.lane_width
                + rng.gen_range(LANE_MARGIN..=config.lane_width - w - LANE_MARGIN);
            let y = slot * slot_height + rng.gen_range(0..=slot_height - SLOT_GAP - h);
            let color = Rgb([
                rng.gen_range(VEHICLE_CHANNEL_MIN..=u8::MAX),
                rng.gen_range(VEHICLE_CHANNEL_MIN..=u8::MAX),
                rng.gen_range(VEHICLE_CHANNEL_MIN..=u8::MAX),
            ]);
            fill_rect(&mut image, x, y, w, h, color);
        }
        true_counts.push(vehicles as u32);
    }

    Ok(Scene {
        image,
        true_counts: CountVector::from(true_counts),
    })
}

/// Writes `count` scenes as `traffic_NNNN.png`, seeding frame `i` with `seed + i`.
pub fn write_scenes(
    config: &SceneConfig,
    count: usize,
    out_dir: &Path,
) -> anyhow::Result<Vec<(PathBuf, CountVector)>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating scene directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(count);
    for index in 0..count {
        let frame_config = SceneConfig {
            seed: config.seed.wrapping_add(index as u64),
            ..config.clone()
        };
        let scene = build_scene(&frame_config)?;
        let path = out_dir.join(format!("traffic_{:04}.png", index));
        scene
            .image
            .save(&path)
            .with_context(|| format!("writing scene {}", path.display()))?;
        info!("generated {} with counts {}", path.display(), scene.true_counts);
        written.push((path, scene.true_counts));
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficcore::{LaneCounter, LaneGeometry};

    #[test]
    fn scene_has_expected_dimensions() {
        let scene = build_scene(&SceneConfig::default()).unwrap();
        assert_eq!(scene.image.dimensions(), (800, 600));
        assert_eq!(scene.true_counts.len(), 4);
        assert!(scene.true_counts.lanes().iter().all(|&c| c <= 4));
    }

    #[test]
    fn same_seed_same_scene() {
        let config = SceneConfig {
            seed: 42,
            ..SceneConfig::default()
        };
        let first = build_scene(&config).unwrap();
        let second = build_scene(&config).unwrap();
        assert_eq!(first.true_counts, second.true_counts);
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn counter_recovers_generated_counts() {
        let counter = LaneCounter::default();
        let geometry = LaneGeometry::new(4, 200.0);
        for seed in 0..8 {
            let scene = build_scene(&SceneConfig {
                seed,
                ..SceneConfig::default()
            })
            .unwrap();
            let counts = counter.count(&scene.image, &geometry).unwrap();
            assert_eq!(counts, scene.true_counts, "seed {}", seed);
        }
    }

    #[test]
    fn narrow_lanes_rejected() {
        let config = SceneConfig {
            lane_width: 80,
            ..SceneConfig::default()
        };
        assert!(build_scene(&config).is_err());
    }

    #[test]
    fn scenes_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig {
            lane_count: 2,
            height: 300,
            seed: 7,
            ..SceneConfig::default()
        };
        let written = write_scenes(&config, 3, dir.path()).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[2].0.ends_with("traffic_0002.png"));
        let reloaded = image::open(&written[0].0).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (400, 300));
    }
}
