use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use interval_visualiser_core::{
    ByteSource, DeviceSource, FrameDriver, RecordingSurface, ScriptedSource, VisualiserConfig,
};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "sdl")]
mod sdl;

fn main() -> interval_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            device,
            config,
            headless,
        } => run_live(device, config.as_deref(), headless),
        Commands::Demo { config, headless } => run_demo(config.as_deref(), headless),
    }
}

fn run_live(
    device: Option<PathBuf>,
    config: Option<&Path>,
    headless: Option<u64>,
) -> interval_visualiser_core::Result<()> {
    let mut config = load_config(config)?;
    if let Some(device) = device {
        config.device = device;
    }
    tracing::info!(device = %config.device.display(), "starting live mode");

    let input = DeviceSource::open(&config.device)?;
    drive(config, input, headless)
}

fn run_demo(config: Option<&Path>, headless: Option<u64>) -> interval_visualiser_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!("starting demo mode with a scripted phrase");
    drive(config, ScriptedSource::demo(), headless)
}

fn load_config(path: Option<&Path>) -> interval_visualiser_core::Result<VisualiserConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            VisualiserConfig::from_path(path)
        }
        None => Ok(VisualiserConfig::default()),
    }
}

fn drive<I: ByteSource>(
    config: VisualiserConfig,
    input: I,
    headless: Option<u64>,
) -> interval_visualiser_core::Result<()> {
    match headless {
        Some(frames) => {
            let mut driver = FrameDriver::new(config, input, RecordingSurface::headless(frames));
            let steps = driver.run()?;
            tracing::info!(steps, notes = driver.registry().len(), "headless run finished");
            Ok(())
        }
        None => run_window(config, input),
    }
}

#[cfg(feature = "sdl")]
fn run_window<I: ByteSource>(config: VisualiserConfig, input: I) -> interval_visualiser_core::Result<()> {
    let surface = sdl::SdlSurface::open(&config)?;
    let mut driver = FrameDriver::new(config, input, surface);
    driver.run()?;
    Ok(())
}

#[cfg(not(feature = "sdl"))]
fn run_window<I: ByteSource>(_config: VisualiserConfig, _input: I) -> interval_visualiser_core::Result<()> {
    Err(interval_visualiser_core::VisualiserError::msg(
        "built without the `sdl` feature; pass --headless <FRAMES> or rebuild with `--features sdl`",
    ))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrolling interval graph of live MIDI notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Visualise notes played on a MIDI character device.
    Live {
        /// Device to read, overriding the configured one.
        #[arg(short, long)]
        device: Option<PathBuf>,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Render this many frames off-screen instead of opening a window.
        #[arg(long, value_name = "FRAMES")]
        headless: Option<u64>,
    },
    /// Play a built-in phrase without any MIDI hardware.
    Demo {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Render this many frames off-screen instead of opening a window.
        #[arg(long, value_name = "FRAMES")]
        headless: Option<u64>,
    },
}
