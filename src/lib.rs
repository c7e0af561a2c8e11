// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod analytics; // 区域分析 (交通密度 / 行人等待)
pub mod authoring; // 区域绘制会话
pub mod config; // 命令行参数
pub mod detection; // 检测结果与检测服务
pub mod error;
pub mod geometry; // 坐标变换与多边形运算
pub mod input; // 视频输入系统
pub mod server; // 配置拉取与结果上报
pub mod settings; // JSON参数文件
pub mod utils;
pub mod worker; // 摄像头工作线程

pub use crate::config::{EditorArgs, SentinelArgs};
pub use crate::error::{Error, Result};
pub use crate::geometry::Point2;
