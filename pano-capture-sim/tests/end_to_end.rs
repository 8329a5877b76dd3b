//! Full capture runs against the simulated backend and a real directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use pano_capture_core::processing::jpeg::compress_nv21;
use pano_capture_core::storage::metadata::read_metadata;
use pano_capture_core::{
    CaptureError, CaptureState, DirectoryStorage, MediaHandle, MosaicContext, MosaicJpeg, PanoramaConfiguration,
    PanoramaDelegate, PanoramaSession, StoredPanorama, SweepProgress,
};
use pano_capture_sim::{HeadlessRenderer, HeadlessSurface, SimulatedCamera, StitcherScript, SyntheticStitcher};

const SETTLE: Duration = Duration::from_secs(10);

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<SweepProgress>>,
    previews: Mutex<Vec<(u32, u32)>>,
    errors: Mutex<Vec<CaptureError>>,
    saved: Mutex<Vec<(StoredPanorama, MediaHandle)>>,
    resets: Mutex<u32>,
}

impl PanoramaDelegate for Recorder {
    fn on_state_changed(&self, _: CaptureState) {}

    fn on_progress_updated(&self, progress: &SweepProgress) {
        self.progress.lock().push(*progress);
    }

    fn on_low_res_preview(&self, preview: &MosaicJpeg) {
        self.previews.lock().push((preview.width, preview.height));
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }

    fn on_panorama_saved(&self, panorama: &StoredPanorama, handle: &MediaHandle) {
        self.saved.lock().push((panorama.clone(), handle.clone()));
    }

    fn on_reset_to_viewfinder(&self) {
        *self.resets.lock() += 1;
    }
}

struct Rig {
    session: PanoramaSession<SimulatedCamera, HeadlessRenderer>,
    stitcher: Arc<SyntheticStitcher>,
    storage: Arc<DirectoryStorage>,
    surface: Arc<HeadlessSurface>,
    recorder: Arc<Recorder>,
    dir: PathBuf,
}

impl Drop for Rig {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pano_sim_test_{}_{}", name, std::process::id()))
}

fn rig(name: &str, script: StitcherScript) -> Rig {
    let dir = temp_dir(name);
    fs::remove_dir_all(&dir).ok();

    let stitcher = Arc::new(SyntheticStitcher::new(script));
    let storage = Arc::new(DirectoryStorage::new(&dir));
    let recorder = Arc::new(Recorder::default());
    let renderer = HeadlessRenderer::new();
    let surface = renderer.surface();

    let config = PanoramaConfiguration {
        output_directory: dir.clone(),
        ..Default::default()
    };
    let mut session = PanoramaSession::new(
        SimulatedCamera::default(),
        renderer,
        MosaicContext::new(stitcher.clone()),
        storage.clone(),
        config,
    )
    .unwrap();
    session.set_delegate(recorder.clone());
    session.on_surface_available().unwrap();

    Rig {
        session,
        stitcher,
        storage,
        surface,
        recorder,
        dir,
    }
}

/// Feed frames until the sweep stops itself.
fn sweep_until_stopped(rig: &mut Rig) {
    let deadline = Instant::now() + SETTLE;
    while rig.session.state().is_capturing() {
        assert!(Instant::now() < deadline, "sweep never completed");
        rig.surface.emit_frame();
        rig.session.process_next(Duration::from_millis(5));
    }
}

fn jpg_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "jpg"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn sweep_stops_at_limit_and_saves_panorama() {
    // 0.3 × 60° = 18° per frame: the ninth frame reaches 162°.
    let mut rig = rig(
        "limit",
        StitcherScript {
            progress_step_x: 0.3,
            ..Default::default()
        },
    );
    assert!(rig.session.start_capture());
    sweep_until_stopped(&mut rig);

    assert!(rig.session.wait_for_finalization(SETTLE));
    assert!(rig.stitcher.frames_processed() >= 9);
    assert!(rig.recorder.progress.lock().iter().all(|p| p.angle_x.abs() < 160.0));
    assert_eq!(*rig.recorder.previews.lock(), vec![(160, 60)]);
    assert!(rig.recorder.errors.lock().is_empty());
    assert_eq!(rig.stitcher.mosaic_requests(), vec![false, true]);

    let files = jpg_files(&rig.dir);
    assert_eq!(files.len(), 1);
    let decoded = image::open(&files[0]).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (640, 240));

    let saved = rig.recorder.saved.lock();
    assert_eq!(saved.len(), 1);
    let (panorama, handle) = &saved[0];
    assert_eq!(panorama.file_path, files[0]);
    assert!(handle.as_str().starts_with("media://panorama/"));

    let entries = rig.storage.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(&entries[0].handle, handle);
    assert_eq!(entries[0].record.width, 640);

    let metadata = read_metadata(&panorama.file_path).unwrap();
    assert_eq!(metadata.image_width, 640);
    assert_eq!(metadata.image_length, 240);
    assert_eq!(metadata.checksum, panorama.checksum);
    assert_eq!(*rig.recorder.resets.lock(), 1);
}

#[test]
fn finished_flag_stops_on_tenth_sample() {
    let mut rig = rig(
        "finished",
        StitcherScript {
            progress_step_x: 0.01,
            finish_after: Some(10),
            ..Default::default()
        },
    );
    rig.session.start_capture();
    sweep_until_stopped(&mut rig);

    assert_eq!(rig.session.diagnostics().progress_samples, 10);
    assert_eq!(rig.recorder.progress.lock().len(), 9);
    assert!(rig.session.wait_for_finalization(SETTLE));
    assert_eq!(jpg_files(&rig.dir).len(), 1);
}

#[test]
fn producer_thread_drives_the_sweep() {
    let mut rig = rig(
        "producer",
        StitcherScript {
            progress_step_x: 0.5,
            ..Default::default()
        },
    );
    rig.session.start_capture();
    let producer = rig.surface.spawn_producer(400, Duration::from_millis(2)).unwrap();

    let deadline = Instant::now() + SETTLE;
    while rig.session.state().is_capturing() && Instant::now() < deadline {
        rig.session.process_next(Duration::from_millis(10));
    }
    assert_eq!(rig.session.state(), CaptureState::Viewfinder);
    assert!(rig.session.wait_for_finalization(SETTLE));
    producer.join().unwrap();

    assert_eq!(rig.recorder.saved.lock().len(), 1);
    assert!(rig.session.renderer().counts().alignments >= 1);
    assert!(rig.session.renderer().counts().first_frames == 1);
}

#[test]
fn aborted_sweep_writes_nothing() {
    let mut rig = rig("aborted", StitcherScript::default());
    rig.session.start_capture();
    for _ in 0..3 {
        rig.surface.emit_frame();
        rig.session.process_next(Duration::from_millis(5));
    }

    assert!(rig.session.stop_capture(true));
    assert!(rig.surface.has_listener());
    assert!(rig.session.wait_for_finalization(SETTLE));
    assert!(rig.stitcher.mosaic_requests().is_empty());
    assert!(jpg_files(&rig.dir).is_empty());
    assert!(rig.storage.entries().unwrap().is_empty());
}

#[test]
fn cancelled_finalization_writes_nothing() {
    let mut rig = rig(
        "cancelled",
        StitcherScript {
            stitch_delay: Duration::from_secs(30),
            ..Default::default()
        },
    );
    rig.session.start_capture();
    rig.surface.emit_frame();
    rig.session.process_next(Duration::from_millis(5));

    assert!(rig.session.stop_capture(false));
    assert!(!rig.session.start_capture());
    rig.session.cancel_computation();

    assert!(rig.session.wait_for_finalization(SETTLE));
    assert_eq!(rig.session.state(), CaptureState::Viewfinder);
    assert!(rig.recorder.errors.lock().is_empty());
    assert_eq!(*rig.recorder.resets.lock(), 1);
    assert!(jpg_files(&rig.dir).is_empty());
    assert!(rig.session.start_capture());
}

#[test]
fn corrupt_trailer_is_reported() {
    let mut rig = rig(
        "corrupt",
        StitcherScript {
            progress_step_x: 1.0,
            corrupt_high_res_trailer: true,
            ..Default::default()
        },
    );
    rig.session.start_capture();
    sweep_until_stopped(&mut rig);

    assert!(rig.session.wait_for_finalization(SETTLE));
    let errors = rig.recorder.errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CaptureError::MalformedBuffer(_)));
    assert!(jpg_files(&rig.dir).is_empty());
    assert_eq!(rig.session.state(), CaptureState::Viewfinder);
}

#[test]
fn teardown_discards_results() {
    let mut rig = rig(
        "teardown",
        StitcherScript {
            progress_step_x: 1.0,
            stitch_delay: Duration::from_millis(200),
            ..Default::default()
        },
    );
    rig.session.start_capture();
    sweep_until_stopped(&mut rig);
    rig.session.tear_down();

    assert!(rig.session.wait_for_finalization(SETTLE));
    assert!(rig.session.diagnostics().messages_discarded >= 1);
    assert!(rig.recorder.saved.lock().is_empty());
    assert!(!rig.surface.has_listener());
    assert!(!rig.session.start_capture());
}

#[test]
fn sessions_share_one_engine_initialization() {
    let rig = rig("shared", StitcherScript::default());
    let geometry = rig.stitcher.geometry().unwrap();
    assert_eq!(geometry, (960, 720, 960 * 720 * 3 / 2 + 32));

    let context = MosaicContext::new(rig.stitcher.clone());
    assert!(!context.is_initialized());
    context.ensure_initialized(960, 720, geometry.2).unwrap();
    assert!(context.is_initialized());
    context.shutdown();
    assert!(!context.is_initialized());
    assert!(!rig.stitcher.has_listener());
}

#[test]
fn jpeg_quality_is_maximal_by_default() {
    let config = PanoramaConfiguration::default();
    assert_eq!(config.jpeg_quality, 100);

    // Quality 100 output is larger than a lower setting for the same mosaic.
    let mut pixels = pano_capture_core::processing::nv21::solid_nv21(64, 32, 90, 100, 160);
    for (i, p) in pixels.iter_mut().take(64 * 32).enumerate() {
        *p = (i % 251) as u8;
    }
    let best = compress_nv21(&pixels, 64, 32, config.jpeg_quality).unwrap();
    let low = compress_nv21(&pixels, 64, 32, 40).unwrap();
    assert!(best.len() > low.len());
}
