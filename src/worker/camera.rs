//! 摄像头工作线程 (Camera worker)
//!
//! ```text
//! Idle --open ok--> Running --read--> Sampling --report--> Running
//!   |                  |   \--read--> Draining ----------> Running
//!   \--open failed--> Stopped <--read error / shutdown--/
//! ```
//!
//! End-of-stream is not a failure: the source is rewound to frame 0 and
//! reading continues, so a finite clip behaves like a live feed.

use super::sink::ReportSink;
use crate::analytics::{analyze_frame, AnalysisResult, Annotator, CameraConfig};
use crate::detection::Detector;
use crate::error::{Error, Result};
use crate::input::FrameSource;
use crate::settings::AnalyticsSettings;
use crossbeam_channel::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Sampling,
    Draining,
    Stopped,
}

/// What one `step` did
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Frame read and discarded by the sampling gate
    Skipped { frame: u64 },
    /// Frame analysed
    Sampled { frame: u64, densities: usize, pedestrian_waiting: bool },
    Stopped,
}

/// Final counters, returned when the worker thread ends
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSummary {
    pub camera: String,
    pub state: WorkerState,
    pub frames: u64,
    pub samples: u64,
    pub loops: u64,
}

pub struct CameraWorker<D, S> {
    config: CameraConfig,
    source: Option<Box<dyn FrameSource>>,
    detector: D,
    sink: S,
    settings: Arc<AnalyticsSettings>,
    annotator: Annotator,
    interval: Duration,
    state: WorkerState,
    last_analysis: Option<Instant>,
    frame_index: Option<u64>,
    frames: u64,
    samples: u64,
    loops: u64,
}

impl<D: Detector, S: ReportSink> CameraWorker<D, S> {
    pub fn new(
        config: CameraConfig,
        detector: D,
        sink: S,
        settings: Arc<AnalyticsSettings>,
        annotator: Annotator,
    ) -> Self {
        let interval = Duration::from_secs_f64(settings.processing_interval_secs.max(0.0));
        Self {
            config,
            source: None,
            detector,
            sink,
            settings,
            annotator,
            interval,
            state: WorkerState::Idle,
            last_analysis: None,
            frame_index: None,
            frames: 0,
            samples: 0,
            loops: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Index of the frame read by the last `step`
    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// Attach the opened source. An open failure stops this worker only.
    pub fn start(&mut self, source: Result<Box<dyn FrameSource>>) -> bool {
        match source {
            Ok(source) => {
                let (w, h) = source.dimensions();
                log::info!(
                    "[{}] ▶️  Started: {} ({}x{}, {} zones)",
                    self.config.name,
                    self.config.video_source,
                    w,
                    h,
                    self.config.rois.len()
                );
                self.source = Some(source);
                self.state = WorkerState::Running;
                true
            }
            Err(e) => {
                log::error!(
                    "[{}] ❌ Could not open {}: {}",
                    self.config.name,
                    self.config.video_source,
                    e
                );
                self.state = WorkerState::Stopped;
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state != WorkerState::Stopped {
            log::info!("[{}] ⏹️  Stopped", self.config.name);
        }
        self.state = WorkerState::Stopped;
        self.source = None;
    }

    /// Read one frame and analyse it if the sampling interval has elapsed
    pub fn step(&mut self, now: Instant) -> Result<Step> {
        if self.state == WorkerState::Stopped || self.state == WorkerState::Idle {
            return Ok(Step::Stopped);
        }
        self.state = WorkerState::Running;
        let frame = self.read_frame()?;
        self.frames += 1;

        let due = self
            .last_analysis
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            self.state = WorkerState::Draining;
            return Ok(Step::Skipped { frame });
        }

        self.state = WorkerState::Sampling;
        self.last_analysis = Some(now);
        let step = match self.sample() {
            Some(result) => {
                self.samples += 1;
                if let Err(e) = self.sink.report(&result) {
                    log::warn!("[{}] ⚠️  Report dropped: {}", self.config.name, e);
                }
                Step::Sampled {
                    frame,
                    densities: result.densities.len(),
                    pedestrian_waiting: result.pedestrian_waiting,
                }
            }
            None => Step::Skipped { frame },
        };
        self.state = WorkerState::Running;
        Ok(step)
    }

    /// Next frame index, rewinding to 0 at end-of-stream
    fn read_frame(&mut self) -> Result<u64> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| Error::Media("no frame source".into()))?;

        if source.read_next()?.is_none() {
            self.loops += 1;
            log::info!("[{}] 🔁 End of video, looping (#{})", self.config.name, self.loops);
            source.seek(0)?;
            if source.read_next()?.is_none() {
                return Err(Error::Media(format!("{}: no frames after rewind", self.config.video_source)));
            }
        }
        let index = source.position().saturating_sub(1);
        self.frame_index = Some(index);
        Ok(index)
    }

    fn sample(&mut self) -> Option<AnalysisResult> {
        let frame = self.source.as_ref()?.current_frame()?;
        let detections = match self.detector.detect(frame) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("[{}] ⚠️  Detection failed: {}", self.config.name, e);
                return None;
            }
        };
        let result = analyze_frame(
            &self.config.name,
            &self.config.rois,
            frame,
            &detections,
            &self.settings,
            &self.annotator,
        );
        log::info!(
            "[{}] 📊 densities {:?} | pollution {:.1} | pedestrians waiting: {}",
            self.config.name,
            result.densities,
            result.pollution_score,
            result.pedestrian_waiting
        );
        Some(result)
    }

    /// Step until `shutdown` fires (message or all senders dropped) or a read fails
    pub fn run(&mut self, shutdown: &Receiver<()>) -> WorkerSummary {
        while self.state != WorkerState::Stopped {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => break,
            }
            if let Err(e) = self.step(Instant::now()) {
                log::error!("[{}] ❌ {}", self.config.name, e);
                break;
            }
        }
        self.stop();
        self.summary()
    }

    pub fn summary(&self) -> WorkerSummary {
        WorkerSummary {
            camera: self.config.name.clone(),
            state: self.state,
            frames: self.frames,
            samples: self.samples,
            loops: self.loops,
        }
    }
}
