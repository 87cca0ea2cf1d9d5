//! OCR Overlay - recognized text drawn over the photo it came from
//!
//! Opens an image, sends it to an OCR engine and shows the detected text
//! regions as tappable boxes on top of the picture.

mod config;
mod geometry;
mod ocr;
mod overlay;
mod session;
mod source;
mod storage;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::ocr::HttpOcrEngine;
use crate::overlay::export::export_annotated;
use crate::overlay::OverlayStyle;
use crate::session::{Event, NoticeKind, SessionController};

/// Extra time given to a headless run on top of the OCR timeout
const ANNOTATE_GRACE: Duration = Duration::from_secs(5);

/// OCR Overlay - view recognized text on top of an image
#[derive(Parser, Debug)]
#[command(name = "ocr-overlay")]
#[command(about = "Run OCR on an image and explore the detected text regions")]
struct Args {
    /// Image to open on startup
    image: Option<PathBuf>,

    /// OCR server endpoint (overrides the configuration file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run OCR without a window and write a copy of the image with boxes drawn on it
    Annotate {
        /// Image to recognize
        image: PathBuf,

        /// Where to write the annotated PNG
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| storage::default_config_path().ok());
    let (mut config, config_warning) = load_or_default_config(config_path.as_deref());

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }

    if let Some(endpoint) = args.endpoint {
        config.ocr.endpoint = endpoint;
    }

    info!("OCR Overlay starting...");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let engine = HttpOcrEngine::new(config.ocr.endpoint.clone(), config.ocr.timeout())
        .context("Failed to create OCR engine")?;
    info!("OCR endpoint: {}", engine.endpoint());
    let controller = SessionController::new(Arc::new(engine), runtime.handle().clone(), config.ocr.timeout())
        .with_overlay_visible(config.overlay.visible_by_default);

    match args.command {
        Some(Command::Annotate { image, output }) => run_annotate(controller, &config, &image, &output),
        None => run_gui(controller, config, config_path, runtime, args.image),
    }
}

/// Load the configuration file, falling back to defaults
///
/// Logging is not set up yet when this runs, so problems are handed back
/// as a message instead of being logged here.
fn load_or_default_config(path: Option<&Path>) -> (AppConfig, Option<String>) {
    let Some(path) = path else {
        return (AppConfig::default(), None);
    };
    if !path.exists() {
        return (AppConfig::default(), None);
    }

    match config::load_config(path) {
        Ok(config) => (config, None),
        Err(e) => (
            AppConfig::default(),
            Some(format!("Ignoring configuration {:?}: {:#}", path, e)),
        ),
    }
}

/// Run the viewer window
fn run_gui(
    mut controller: SessionController,
    config: AppConfig,
    config_path: Option<PathBuf>,
    runtime: tokio::runtime::Runtime,
    image: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = image {
        controller.open_path(&path);
    }

    if let Err(e) = ui::run_viewer(controller, config, config_path, runtime) {
        bail!("Viewer error: {}", e);
    }

    info!("OCR Overlay shutdown complete");
    Ok(())
}

/// Recognize one image headlessly and export it with boxes drawn on
fn run_annotate(mut controller: SessionController, config: &AppConfig, image: &Path, output: &Path) -> Result<()> {
    controller.open_path(image);
    let Some(source) = controller.state().image.clone() else {
        let reason = controller
            .state()
            .notice
            .as_ref()
            .map(|n| n.message.clone())
            .unwrap_or_default();
        bail!("Could not open {:?}: {}", image, reason);
    };

    controller.dispatch(Event::OcrRequested);
    if !controller.wait_for_completion(config.ocr.timeout() + ANNOTATE_GRACE) {
        bail!("No response from OCR engine '{}'", controller.engine_name());
    }

    let state = controller.state();
    if let Some(notice) = &state.notice {
        if notice.kind == NoticeKind::Error {
            bail!("{}", notice.message);
        }
    }
    let Some(result) = &state.result else {
        bail!("OCR finished without a result");
    };

    let style = OverlayStyle::from_settings(&config.overlay);
    for (idx, region) in result.regions.iter().enumerate() {
        println!(
            "{:>3}  {:>5.1}%  {:<6}  {}",
            idx + 1,
            region.score * 100.0,
            style.tier(region.score).label(),
            region.text
        );
    }

    export_annotated(&source, result, &style, output)
}
