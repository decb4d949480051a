use anyhow::Context;
use api::bridge::{bind_address, ApiBridge};
use clap::Parser;
use generator::scene::{write_scenes, SceneConfig};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use trafficcore::prelude::{AllocatorKind, CounterConfig};
use workflow::config::WorkflowConfig;
use workflow::runner::{AnalysisResult, Runner};

mod api;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Lane-density signal timing driver")]
struct Args {
    /// Write N synthetic road scenes into the data directory
    #[arg(long)]
    generate: Option<usize>,
    /// Seed for the first generated scene
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Analyze a single image
    #[arg(long)]
    image: Option<PathBuf>,
    /// Analyze the last image (by name) in the data directory
    #[arg(long, default_value_t = false)]
    latest: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    lanes: usize,
    #[arg(long, default_value_t = 200.0)]
    lane_width: f64,
    #[arg(long, default_value_t = 127)]
    threshold: u8,
    /// Minimum blob area in px² counted as a vehicle
    #[arg(long, default_value_t = 100.0)]
    min_area: f64,
    /// Count every blob regardless of area
    #[arg(long, default_value_t = false)]
    no_noise_filter: bool,
    /// Timing strategy: proportional or global-factor
    #[arg(long, default_value = "proportional")]
    strategy: AllocatorKind,
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Serve the HTTP bridge until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

impl Args {
    fn counter_config(&self) -> CounterConfig {
        CounterConfig {
            threshold: self.threshold,
            min_blob_area: (!self.no_noise_filter).then_some(self.min_area),
        }
    }
}

fn print_report(result: &AnalysisResult) {
    if let Some(path) = &result.image_path {
        println!("Analyzed image: {}", path.display());
    }
    println!("Lane counts: {}", result.counts);
    println!("Traffic prediction: {}", result.prediction.description());
    for (lane, timing) in result.timings.per_lane.iter().enumerate() {
        println!(
            "Lane {} -> green {}s, yellow {}s, red {}s",
            lane + 1,
            timing.green,
            timing.yellow,
            timing.red
        );
    }
    println!("Cycle length: {}s", result.timings.cycle_length);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.lanes,
            args.lane_width,
            args.counter_config(),
            args.strategy,
        )
        .with_data_dir(args.data_dir.clone())
    };

    if let Some(count) = args.generate {
        let lane_width = workflow_config.lane_width.round() as u32;
        let scene_config = SceneConfig {
            lane_count: workflow_config.lane_count,
            lane_width,
            seed: args.seed,
            ..SceneConfig::default()
        };
        let written = write_scenes(&scene_config, count, &workflow_config.data_dir)
            .context("generating synthetic scenes")?;
        println!(
            "Generated {} traffic images in {}",
            written.len(),
            workflow_config.data_dir.display()
        );
    }

    let runner = Runner::new(workflow_config);
    let bridge = ApiBridge::new(Arc::new(runner.clone()));

    let target = if args.latest {
        Some(runner.latest_image()?)
    } else {
        args.image.clone()
    };
    if let Some(path) = target {
        let result = runner.analyze_path(&path)?;
        print_report(&result);
        bridge.publish(&result);
    }

    if args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the HTTP bridge")?;
        runtime.block_on(async {
            info!("HTTP bridge running (Ctrl+C to stop)...");
            bridge
                .serve(bind_address(args.port), async {
                    if let Err(err) = signal::ctrl_c().await {
                        log::error!("awaiting Ctrl+C failed: {}", err);
                    }
                })
                .await
        })?;
    }

    Ok(())
}
