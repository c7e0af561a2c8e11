/// 工具模块
/// Utility modules
pub mod jpeg;

pub use jpeg::{encode_jpeg, encode_jpeg_base64};
