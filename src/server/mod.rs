/// 配置与上报 (Configuration service client)
pub mod client;
pub mod schema;

pub use client::{MetricsReport, ServerClient, ViolationReport};
pub use schema::{normalize_camera, parse_cameras, RoiAdapter, RoiRecord};
