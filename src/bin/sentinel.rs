/// 路口卫兵 (Intersection Sentinel)
///
/// 每个摄像头一个独立工作线程:
/// 1. 启动时拉取一次路口配置 (摄像头 + 区域)
/// 2. 循环读取视频帧, 每隔固定间隔检测并分析一次
/// 3. 上报各区域密度、污染分数、行人等待状态和标注图像
///
/// 运行: cargo run --bin sentinel --release -- --intersection-id <id>
use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use roi_sentinel::analytics::Annotator;
use roi_sentinel::detection::RemoteDetector;
use roi_sentinel::server::ServerClient;
use roi_sentinel::settings::AnalyticsSettings;
use roi_sentinel::worker::{join_all, HttpWorkerFactory, Orchestrator};
use roi_sentinel::SentinelArgs;
use std::sync::Arc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = SentinelArgs::parse();

    let settings = AnalyticsSettings::load(&args.settings);
    let annotator = Annotator::from_settings(&settings).context("loading overlay font")?;
    if !annotator.has_font() {
        log::warn!("⚠️  No font_path configured, zone labels will not be drawn");
    }

    log::info!("🚀 Sentinel starting for intersection {}", args.intersection_id);
    log::info!("📦 Detector: {}", args.detector_url);
    log::info!("⏱️  Sampling every {:.1}s", settings.processing_interval_secs);

    let client = ServerClient::new(&args.server_url);
    let factory = Arc::new(HttpWorkerFactory {
        detector: RemoteDetector::new(args.detector_url.clone(), settings.jpeg_quality),
        client: client.clone(),
        intersection_id: args.intersection_id.clone(),
        video_dir: args.video_dir.clone(),
        jpeg_quality: settings.jpeg_quality,
    });

    let orchestrator = Orchestrator::new(client, args.intersection_id.clone(), settings, annotator);

    // workers run until the process ends; dropping `_shutdown` stops them
    let (_shutdown, shutdown_rx) = bounded::<()>(1);
    let handles = orchestrator
        .start(factory, &shutdown_rx)
        .context("no camera workers started")?;

    for summary in join_all(handles) {
        log::info!(
            "[{}] {:?}: {} frames, {} samples, {} loops",
            summary.camera,
            summary.state,
            summary.frames,
            summary.samples,
            summary.loops
        );
    }
    Ok(())
}
