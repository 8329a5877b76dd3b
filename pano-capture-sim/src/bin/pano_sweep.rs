//! Run one simulated panorama sweep end to end and write the result to disk.
//!
//! Set `RUST_LOG=debug` to see per-frame sweep feedback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use pano_capture_core::{CaptureError, DirectoryStorage, MosaicContext, PanoramaConfiguration, PanoramaSession, PreviewSize};
use pano_capture_sim::{HeadlessRenderer, LoggingDelegate, SimulatedCamera, StitcherScript, SyntheticStitcher};

#[derive(Parser)]
#[command(name = "pano-sweep")]
#[command(about = "Capture a panorama from a simulated camera sweep")]
#[command(version)]
struct Cli {
    /// Directory to write the panorama into
    #[arg(short, long, default_value = "panoramas")]
    output: PathBuf,

    /// Camera frames to emit before the sweep is stopped by hand
    #[arg(short, long, default_value = "120")]
    frames: u64,

    /// Milliseconds between camera frames
    #[arg(long, default_value = "5")]
    interval_ms: u64,

    /// Horizontal field of view in degrees
    #[arg(long, default_value = "60")]
    h_angle: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "46")]
    v_angle: f32,

    /// Horizontal progress per frame, as a fraction of the field of view
    #[arg(long, default_value = "0.05")]
    step: f32,

    /// Sweep angle at which capture stops on its own
    #[arg(long, default_value = "160")]
    sweep_limit: f32,

    /// High-res mosaic width
    #[arg(long, default_value = "1280")]
    mosaic_width: u32,

    /// High-res mosaic height
    #[arg(long, default_value = "320")]
    mosaic_height: u32,

    /// Device orientation at capture time (0, 90, 180, 270)
    #[arg(long, default_value = "0")]
    orientation: u32,
}

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("pano-sweep failed: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CaptureError> {
    let config = PanoramaConfiguration {
        sweep_limit_degrees: cli.sweep_limit,
        output_directory: cli.output.clone(),
        capture_orientation: cli.orientation,
        ..Default::default()
    };

    let stitcher = Arc::new(SyntheticStitcher::new(StitcherScript {
        progress_step_x: cli.step,
        mosaic_width: cli.mosaic_width,
        mosaic_height: cli.mosaic_height,
        stitch_delay: Duration::from_millis(50),
        ..Default::default()
    }));
    let context = MosaicContext::new(stitcher.clone());
    let storage = Arc::new(DirectoryStorage::new(config.output_directory.clone()));

    let camera = SimulatedCamera::new(PreviewSize::new(960, 720), cli.h_angle, cli.v_angle);
    let renderer = HeadlessRenderer::new();
    let surface = renderer.surface();

    let mut session = PanoramaSession::new(camera, renderer, context, storage, config)?;
    session.set_delegate(Arc::new(LoggingDelegate));
    session.on_surface_available()?;

    if !session.start_capture() {
        return Err(CaptureError::Unknown("capture did not start".into()));
    }

    let producer = surface
        .spawn_producer(cli.frames, Duration::from_millis(cli.interval_ms))
        .map_err(|e| CaptureError::Unknown(format!("failed to spawn camera producer: {}", e)))?;

    while session.state().is_capturing() {
        session.process_next(Duration::from_millis(20));
        if producer.is_finished() && session.state().is_capturing() {
            session.process_pending();
            if session.state().is_capturing() {
                log::info!("Out of frames, stopping sweep by hand");
                session.stop_capture(false);
            }
        }
    }

    if !session.wait_for_finalization(Duration::from_secs(30)) {
        session.cancel_computation();
        return Err(CaptureError::Unknown("timed out waiting for panorama".into()));
    }

    let diagnostics = session.diagnostics();
    log::info!(
        "{} frames emitted, {} dispatched, {} submitted to the engine",
        surface.frames_emitted(),
        diagnostics.frames_dispatched,
        diagnostics.frames_submitted
    );

    match session.last_saved() {
        Some((panorama, handle)) => {
            println!("{} {}", handle, panorama.file_path.display());
            Ok(())
        }
        None => Err(CaptureError::Unknown("no panorama was saved".into())),
    }
}
