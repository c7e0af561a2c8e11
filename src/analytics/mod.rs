/// 区域分析 (Zone analytics)
///
/// - roi:      zone and camera definitions
/// - zone:     traffic density / pollution and pedestrian waiting
/// - annotate: outlines and metric text on the reported frame
pub mod annotate;
pub mod roi;
pub mod zone;

pub use annotate::Annotator;
pub use roi::{CameraConfig, Roi, RoiKind};
pub use zone::{
    analyze_frame, classify_pedestrian, classify_traffic, AnalysisResult, TrafficMetric, ZoneMetric,
    ZoneValue,
};
