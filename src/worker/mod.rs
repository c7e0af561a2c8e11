/// 工作线程系统 (Workers)
///
/// - camera:       one camera's read / sample / report loop
/// - sink:         where sampling results are delivered
/// - orchestrator: config fetch and one thread per camera
pub mod camera;
pub mod orchestrator;
pub mod sink;

pub use camera::{CameraWorker, Step, WorkerState, WorkerSummary};
pub use orchestrator::{
    join_all, resolve_video_source, ConfigSource, HttpWorkerFactory, Orchestrator, WorkerFactory,
};
pub use sink::{ChannelSink, HttpSink, ReportSink};
