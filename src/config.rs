/// 命令行参数 (Command-line arguments)
use crate::analytics::RoiKind;
use clap::Parser;
use std::path::PathBuf;

/// 路口监控: 每个摄像头一个工作线程
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Per-camera traffic and pedestrian zone analytics", long_about = None)]
pub struct SentinelArgs {
    /// Intersection config endpoint; cameras are fetched from `<url>/<id>`
    #[arg(long, default_value = "http://localhost:5001/api/intersections")]
    pub server_url: String,

    /// Intersection identifier
    #[arg(short, long)]
    pub intersection_id: String,

    /// Object detection service (POST JPEG, returns detections)
    #[arg(short, long, default_value = "http://localhost:8000/detect")]
    pub detector_url: String,

    /// Directory prefixed to relative `videoSource` paths
    #[arg(long, default_value = "videos")]
    pub video_dir: PathBuf,

    /// Analytics settings file (created with defaults if missing)
    #[arg(long, default_value = "sentinel.json")]
    pub settings: String,
}

/// 区域绘制工具
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Draw a zone polygon over an image or video", long_about = None)]
pub struct EditorArgs {
    /// Image or video to draw on
    pub media: PathBuf,

    /// Editor settings file (created with defaults if missing)
    #[arg(long, default_value = "roi_editor.json")]
    pub settings: String,

    /// Zone name written with the confirmed polygon
    #[arg(short, long, default_value = "zone")]
    pub name: String,

    /// Zone type: traffic or pedestrian
    #[arg(short, long, default_value = "traffic")]
    pub kind: RoiKind,

    /// Also write the confirmed zone JSON here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_defaults() {
        let args = SentinelArgs::parse_from(["sentinel", "-i", "42"]);
        assert_eq!(args.intersection_id, "42");
        assert_eq!(args.server_url, "http://localhost:5001/api/intersections");
        assert_eq!(args.video_dir, PathBuf::from("videos"));
    }

    #[test]
    fn test_editor_kind() {
        let args = EditorArgs::parse_from(["roi_editor", "cam.mp4", "--kind", "pedestrian", "-n", "Crossing"]);
        assert_eq!(args.kind, RoiKind::Pedestrian);
        assert_eq!(args.name, "Crossing");
        assert!(args.output.is_none());
    }

    #[test]
    fn test_missing_intersection_is_rejected() {
        assert!(SentinelArgs::try_parse_from(["sentinel"]).is_err());
    }
}
