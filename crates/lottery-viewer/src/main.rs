//! Lottery Machine Viewer
//!
//! Runs a draw either in a window (gizmo rendering, Space for a new draw,
//! Enter to kick the balls early) or headless, printing the reward as JSON.

use std::path::PathBuf;

use anyhow::Context;
use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use clap::Parser;
use lottery_core::bevy::{CommandQueue, LotteryUnifiedPlugin};
use lottery_core::{LotteryScene, SceneConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Physics-driven lottery ball machine", version)]
struct Args {
    /// Scene configuration (JSON). Defaults to the bundled scene.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the RNG seed of the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Run the draw without a window and print the reward.
    #[arg(long)]
    headless: bool,
    /// Frame limit for headless draws.
    #[arg(long, default_value_t = 3600)]
    max_frames: u64,
    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    if args.headless {
        run_headless(config, args.max_frames)
    } else {
        run_windowed(config);
        Ok(())
    }
}

fn load_config(args: &Args) -> anyhow::Result<SceneConfig> {
    let config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default_scene(),
    };
    let config = match args.seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    };
    config.validate()?;
    tracing::info!("[config] seed {}", config.rng_seed);
    Ok(config)
}

fn run_headless(config: SceneConfig, max_frames: u64) -> anyhow::Result<()> {
    let mut scene = LotteryScene::new(config)?;
    let Some(reward) = scene.run_until_presented(max_frames) else {
        anyhow::bail!(
            "draw did not finish within {max_frames} frames (stuck in {})",
            scene.phase().name()
        );
    };
    tracing::info!(
        "[reward] ball {} after {} frames ({:.2}s)",
        reward.ball_id,
        scene.frame(),
        scene.elapsed()
    );
    println!("{}", serde_json::to_string_pretty(&reward)?);
    Ok(())
}

fn run_windowed(config: SceneConfig) {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Lottery Machine".to_string(),
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );

    app.insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::Continuous,
    });
    app.insert_resource(ClearColor(Color::srgb(0.1, 0.09, 0.12)));

    tracing::info!("[scene] adding LotteryUnifiedPlugin");
    app.add_plugins(LotteryUnifiedPlugin::new(config, CommandQueue::new()));
    app.run();
}
