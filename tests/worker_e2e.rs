use crossbeam_channel::{unbounded, Sender};
use image::RgbImage;
use roi_sentinel::analytics::{AnalysisResult, Annotator, CameraConfig, Roi, RoiKind};
use roi_sentinel::detection::{BBox, Detection, Detector};
use roi_sentinel::input::{FrameSource, MemoryClip};
use roi_sentinel::settings::AnalyticsSettings;
use roi_sentinel::worker::{
    join_all, CameraWorker, ChannelSink, ConfigSource, Orchestrator, Step, WorkerFactory, WorkerState,
};
use roi_sentinel::{Error, Point2, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Scripted(Vec<Detection>);

impl Detector for Scripted {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
        Ok(self.0.clone())
    }
}

fn square(name: &str, kind: RoiKind) -> Roi {
    Roi::new(
        name,
        kind,
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ],
    )
}

fn camera(name: &str, video: &str, rois: Vec<Roi>) -> CameraConfig {
    CameraConfig {
        name: name.into(),
        video_source: video.into(),
        rois,
    }
}

fn clip(frames: usize) -> Box<dyn FrameSource> {
    Box::new(MemoryClip::new(vec![RgbImage::new(200, 200); frames], 25.0))
}

fn worker(
    config: CameraConfig,
    detections: Vec<Detection>,
    results: Sender<AnalysisResult>,
) -> CameraWorker<Scripted, ChannelSink> {
    CameraWorker::new(
        config,
        Scripted(detections),
        ChannelSink::new(results),
        Arc::new(AnalyticsSettings::default()),
        Annotator::plain(),
    )
}

#[test]
fn test_ten_frame_video_loops_back_to_zero() {
    let (tx, _rx) = unbounded();
    let mut w = worker(camera("loop", "loop.mp4", vec![square("A", RoiKind::Traffic)]), vec![], tx);
    assert!(w.start(Ok(clip(10))));

    let t0 = Instant::now();
    for expected in 0..10u64 {
        w.step(t0).unwrap();
        assert_eq!(w.frame_index(), Some(expected));
    }
    // frame 9 was the last one; the next read fails and the worker rewinds
    w.step(t0).unwrap();
    assert_eq!(w.frame_index(), Some(0));
    assert_eq!(w.loops(), 1);
    assert_eq!(w.state(), WorkerState::Draining);
}

#[test]
fn test_quarter_density_and_pollution_reported() {
    let (tx, rx) = unbounded();
    let car = Detection::new("lmv", 0.9, BBox::new(25.0, 25.0, 75.0, 75.0));
    let mut w = worker(camera("north", "n.mp4", vec![square("Lane 1", RoiKind::Traffic)]), vec![car], tx);
    w.start(Ok(clip(3)));

    assert!(matches!(w.step(Instant::now()).unwrap(), Step::Sampled { densities: 1, .. }));
    let result = rx.try_recv().unwrap();
    assert_eq!(result.camera_name, "north");
    assert!((result.densities["Lane 1"] - 25.0).abs() < 1e-9);
    assert_eq!(result.pollution_score, 3.0);
    assert!(!result.pedestrian_waiting);
}

#[test]
fn test_pedestrian_head_inside_body_outside() {
    let (tx, rx) = unbounded();
    // top edge midpoint (50, 80) inside, centre (50, 140) outside
    let person = Detection::new("person", 0.8, BBox::new(35.0, 80.0, 65.0, 200.0));
    let mut w = worker(
        camera("cross", "c.mp4", vec![square("Crossing", RoiKind::Pedestrian)]),
        vec![person],
        tx,
    );
    w.start(Ok(clip(1)));

    assert!(matches!(
        w.step(Instant::now()).unwrap(),
        Step::Sampled { pedestrian_waiting: true, .. }
    ));
    let result = rx.try_recv().unwrap();
    assert!(result.pedestrian_waiting);
    assert_eq!(result.pedestrian_counts["Crossing"], 1);
    assert!(result.densities.is_empty());
}

enum FakeServer {
    Down,
    Cameras(Vec<CameraConfig>),
}

impl ConfigSource for FakeServer {
    fn fetch_cameras(&self, _intersection_id: &str) -> Result<Vec<CameraConfig>> {
        match self {
            FakeServer::Down => Err(Error::Transport("connection refused".into())),
            FakeServer::Cameras(c) => Ok(c.clone()),
        }
    }
}

struct MemoryFactory {
    detections: Vec<Detection>,
    results: Sender<AnalysisResult>,
    opened: AtomicUsize,
}

impl MemoryFactory {
    fn new(detections: Vec<Detection>, results: Sender<AnalysisResult>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            results,
            opened: AtomicUsize::new(0),
        })
    }
}

impl WorkerFactory for MemoryFactory {
    type Detector = Scripted;
    type Sink = ChannelSink;

    fn detector(&self, _camera: &CameraConfig) -> Scripted {
        Scripted(self.detections.clone())
    }

    fn sink(&self, _camera: &CameraConfig) -> ChannelSink {
        ChannelSink::new(self.results.clone())
    }

    fn open(&self, camera: &CameraConfig) -> Result<Box<dyn FrameSource>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if camera.video_source == "missing.mp4" {
            return Err(Error::Media("missing.mp4: no such file".into()));
        }
        Ok(clip(4))
    }
}

fn orchestrator(server: FakeServer) -> Orchestrator<FakeServer> {
    Orchestrator::new(server, "7", AnalyticsSettings::default(), Annotator::plain())
}

#[test]
fn test_fetch_failure_starts_nothing() {
    let (tx, _rx) = unbounded();
    let factory = MemoryFactory::new(vec![], tx);
    let (_stop, stop_rx) = unbounded::<()>();

    assert!(orchestrator(FakeServer::Down).start(factory.clone(), &stop_rx).is_err());
    assert!(orchestrator(FakeServer::Cameras(vec![])).start(factory.clone(), &stop_rx).is_err());
    assert_eq!(factory.opened.load(Ordering::SeqCst), 0);
}

#[test]
fn test_one_bad_camera_does_not_stop_the_others() {
    let (tx, rx) = unbounded();
    let car = Detection::new("bus", 0.9, BBox::new(10.0, 10.0, 30.0, 30.0));
    let factory = MemoryFactory::new(vec![car], tx);
    let (stop_tx, stop_rx) = unbounded::<()>();

    let cameras = vec![
        camera("broken", "missing.mp4", vec![square("A", RoiKind::Traffic)]),
        camera("good", "good.mp4", vec![square("B", RoiKind::Traffic)]),
    ];
    let handles = orchestrator(FakeServer::Cameras(cameras))
        .start(factory.clone(), &stop_rx)
        .unwrap();
    assert_eq!(handles.len(), 2);

    let result = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(result.camera_name, "good");
    assert_eq!(result.pollution_score, 8.0);

    drop(stop_tx);
    let mut summaries = join_all(handles);
    summaries.sort_by(|a, b| a.camera.cmp(&b.camera));
    assert_eq!(summaries[0].camera, "broken");
    assert_eq!(summaries[0].frames, 0);
    assert_eq!(summaries[0].state, WorkerState::Stopped);
    assert_eq!(summaries[1].camera, "good");
    assert!(summaries[1].samples >= 1);
    assert_eq!(factory.opened.load(Ordering::SeqCst), 2);
}
