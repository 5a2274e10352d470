use anyhow::Context;
use clap::Parser;
use log::info;
use roomlight::io::config::Config;
use std::path::PathBuf;

mod app;

/// Software-rendered furnished room with switchable lights.
#[derive(Parser, Debug)]
#[command(name = "roomlight", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Program state file; overrides `paths.state_file` from the config
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Render a single frame to `--output` without opening a window
    #[arg(long)]
    headless: bool,

    /// Output image for headless mode
    #[arg(short, long, value_name = "FILE", default_value = "roomlight.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {path:?}");
            Config::load(path).with_context(|| format!("could not load config {path:?}"))?
        }
        None => {
            info!("Using default settings");
            Config::default()
        }
    };
    if let Some(state) = cli.state {
        config.paths.state_file = state;
    }

    if cli.headless {
        app::run_headless(&config, &cli.output)
    } else {
        app::run_gui(config)
    }
}
