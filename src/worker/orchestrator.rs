/// 工作线程调度 (Worker orchestrator)
///
/// Fetch the camera list once, then run one OS thread per camera. Workers
/// share nothing mutable; each owns its source, zones and timing.
use super::camera::{CameraWorker, WorkerState, WorkerSummary};
use super::sink::{HttpSink, ReportSink};
use crate::analytics::{Annotator, CameraConfig};
use crate::detection::{Detector, RemoteDetector};
use crate::error::{Error, Result};
use crate::input::{open_source, FrameSource};
use crate::server::ServerClient;
use crate::settings::AnalyticsSettings;
use crossbeam_channel::{unbounded, Receiver};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Thread body; `true` once every worker thread exists, `false` if the launch was aborted
type GatedJob<T> = Box<dyn FnOnce(bool) -> T + Send>;

/// Where the camera list comes from
pub trait ConfigSource {
    fn fetch_cameras(&self, intersection_id: &str) -> Result<Vec<CameraConfig>>;
}

impl ConfigSource for ServerClient {
    fn fetch_cameras(&self, intersection_id: &str) -> Result<Vec<CameraConfig>> {
        ServerClient::fetch_cameras(self, intersection_id)
    }
}

/// Builds the per-camera collaborators inside each worker thread
pub trait WorkerFactory: Send + Sync + 'static {
    type Detector: Detector + 'static;
    type Sink: ReportSink + 'static;

    fn detector(&self, camera: &CameraConfig) -> Self::Detector;

    fn sink(&self, camera: &CameraConfig) -> Self::Sink;

    fn open(&self, camera: &CameraConfig) -> Result<Box<dyn FrameSource>>;
}

/// Production wiring: HTTP detector, HTTP reports, files under `video_dir`
pub struct HttpWorkerFactory {
    pub detector: RemoteDetector,
    pub client: ServerClient,
    pub intersection_id: String,
    pub video_dir: PathBuf,
    pub jpeg_quality: u8,
}

impl WorkerFactory for HttpWorkerFactory {
    type Detector = RemoteDetector;
    type Sink = HttpSink;

    fn detector(&self, _camera: &CameraConfig) -> RemoteDetector {
        self.detector.clone()
    }

    fn sink(&self, _camera: &CameraConfig) -> HttpSink {
        HttpSink::new(self.client.clone(), self.intersection_id.clone(), self.jpeg_quality)
    }

    fn open(&self, camera: &CameraConfig) -> Result<Box<dyn FrameSource>> {
        let path = resolve_video_source(&self.video_dir, &camera.video_source);
        open_source(Path::new(&path))
    }
}

/// Relative `videoSource` values live under `video_dir`; URLs and absolute paths are kept.
pub fn resolve_video_source(video_dir: &Path, video_source: &str) -> String {
    if video_source.contains("://") || Path::new(video_source).is_absolute() {
        video_source.to_string()
    } else {
        video_dir.join(video_source).to_string_lossy().into_owned()
    }
}

pub struct Orchestrator<C> {
    config: C,
    intersection_id: String,
    settings: Arc<AnalyticsSettings>,
    annotator: Annotator,
}

impl<C: ConfigSource> Orchestrator<C> {
    pub fn new(config: C, intersection_id: impl Into<String>, settings: AnalyticsSettings, annotator: Annotator) -> Self {
        Self {
            config,
            intersection_id: intersection_id.into(),
            settings: Arc::new(settings),
            annotator,
        }
    }

    /// Fetch once. An error or an empty list means no worker may start.
    pub fn load_cameras(&self) -> Result<Vec<CameraConfig>> {
        let cameras = self.config.fetch_cameras(&self.intersection_id)?;
        if cameras.is_empty() {
            return Err(Error::Config(format!(
                "no usable cameras for intersection {}",
                self.intersection_id
            )));
        }
        log::info!("✅ Found {} camera(s) for intersection {}", cameras.len(), self.intersection_id);
        Ok(cameras)
    }

    /// Start one thread per camera. Nothing runs if the fetch fails, and
    /// nothing keeps running if any thread cannot be spawned.
    pub fn start<F: WorkerFactory>(
        &self,
        factory: Arc<F>,
        shutdown: &Receiver<()>,
    ) -> Result<Vec<JoinHandle<WorkerSummary>>> {
        let cameras = self.load_cameras()?;
        let jobs = cameras
            .into_iter()
            .map(|camera| {
                let factory = factory.clone();
                let settings = self.settings.clone();
                let annotator = self.annotator.clone();
                let shutdown = shutdown.clone();
                let name = camera.name.clone();

                let job: GatedJob<WorkerSummary> = Box::new(move |go| {
                    if !go {
                        return WorkerSummary {
                            camera: camera.name,
                            state: WorkerState::Idle,
                            frames: 0,
                            samples: 0,
                            loops: 0,
                        };
                    }
                    let detector = factory.detector(&camera);
                    let sink = factory.sink(&camera);
                    let source = factory.open(&camera);
                    let mut worker = CameraWorker::new(camera, detector, sink, settings, annotator);
                    if !worker.start(source) {
                        return worker.summary();
                    }
                    worker.run(&shutdown)
                });
                (format!("camera-{}", name), job)
            })
            .collect();

        let handles = spawn_gated(jobs, |name, body| thread::Builder::new().name(name).spawn(body))?;
        for handle in &handles {
            log::info!("🚀 Worker thread started: {}", handle.thread().name().unwrap_or("camera"));
        }
        Ok(handles)
    }
}

/// Spawn every job, then release them together. If a spawn fails the gate
/// closes, the threads already spawned return without running and are joined.
fn spawn_gated<T, S>(jobs: Vec<(String, GatedJob<T>)>, mut spawn: S) -> Result<Vec<JoinHandle<T>>>
where
    T: Send + 'static,
    S: FnMut(String, Box<dyn FnOnce() -> T + Send>) -> io::Result<JoinHandle<T>>,
{
    let (gate_tx, gate_rx) = unbounded::<()>();
    let mut handles = Vec::with_capacity(jobs.len());
    for (name, job) in jobs {
        let gate = gate_rx.clone();
        match spawn(name.clone(), Box::new(move || job(gate.recv().is_ok()))) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                log::error!("❌ Could not spawn {}: {}", name, e);
                drop(gate_tx);
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(e.into());
            }
        }
    }
    for _ in 0..handles.len() {
        let _ = gate_tx.send(());
    }
    Ok(handles)
}

/// Wait for every worker. A panicking worker is reported as stopped.
pub fn join_all(handles: Vec<JoinHandle<WorkerSummary>>) -> Vec<WorkerSummary> {
    handles
        .into_iter()
        .map(|h| {
            let name = h.thread().name().unwrap_or("camera").to_string();
            h.join().unwrap_or_else(|_| {
                log::error!("❌ {} panicked", name);
                WorkerSummary {
                    camera: name,
                    state: WorkerState::Stopped,
                    frames: 0,
                    samples: 0,
                    loops: 0,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_jobs(n: usize, ran: &Arc<AtomicUsize>) -> Vec<(String, GatedJob<bool>)> {
        (0..n)
            .map(|i| {
                let ran = ran.clone();
                let job: GatedJob<bool> = Box::new(move |go| {
                    if go {
                        ran.fetch_add(1, Ordering::SeqCst);
                    }
                    go
                });
                (format!("camera-{}", i), job)
            })
            .collect()
    }

    #[test]
    fn test_spawn_gated_releases_all() {
        let ran = Arc::new(AtomicUsize::new(0));
        let handles = spawn_gated(counting_jobs(3, &ran), |name, body| {
            thread::Builder::new().name(name).spawn(body)
        })
        .unwrap();
        let started: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(started, [true, true, true]);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_spawn_failure_stops_started_threads() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut calls = 0;
        let result = spawn_gated(counting_jobs(3, &ran), |name, body| {
            calls += 1;
            if calls == 3 {
                return Err(io::Error::new(io::ErrorKind::Other, "out of threads"));
            }
            thread::Builder::new().name(name).spawn(body)
        });
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resolve_video_source() {
        let dir = Path::new("videos");
        assert_eq!(
            resolve_video_source(dir, "north.mp4"),
            Path::new("videos").join("north.mp4").to_string_lossy()
        );
        assert_eq!(resolve_video_source(dir, "rtsp://cam/1"), "rtsp://cam/1");
        assert_eq!(resolve_video_source(dir, "/data/a.mp4"), "/data/a.mp4");
    }
}
