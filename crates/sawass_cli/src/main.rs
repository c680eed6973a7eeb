//! Sawass command line renderer.
//!
//! Renders one of the built-in demo scenes to a PNG:
//!
//! ```text
//! sawass [--scene random|perlin|ground|lights] [--config render.json] [--output out.png]
//! ```

mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sawass_tracer::{render, RenderConfig};

use scenes::DemoScene;

#[derive(Parser, Debug, PartialEq)]
#[clap(name = "sawass", about = "CPU path tracer for sphere scenes")]
struct CliArgs {
    /// Demo scene to render
    #[clap(short, long, value_enum, default_value_t = DemoScene::Random)]
    scene: DemoScene,

    /// JSON render settings (width, height, samples_per_pixel, max_depth,
    /// background, seed)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[clap(short, long, default_value = "render.png")]
    output: PathBuf,
}

fn load_config(args: &CliArgs) -> Result<RenderConfig> {
    let Some(path) = &args.config else {
        return Ok(RenderConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    log::info!("Loaded render config from {}", path.display());
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    log::info!("Starting Sawass ({} scene)", args.scene);

    let mut config = load_config(&args)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let demo = args
        .scene
        .build(config.aspect_ratio(), &mut rng)
        .inspect_err(|e| log::error!("Scene setup failed: {e:#}"))?;

    if let Some(background) = demo.background {
        config.background = background;
    }

    let image = render(&demo.camera, &demo.scene, &config);
    image
        .save_png(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}
