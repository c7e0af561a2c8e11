/// 检测系统 (Detection)
///
/// Object detection is an external collaborator. Workers only see the
/// `Detector` trait; `RemoteDetector` talks to an HTTP inference service.
pub mod remote;
pub mod types;

pub use remote::RemoteDetector;
pub use types::{BBox, Detection};

use crate::error::Result;
use image::RgbImage;

pub trait Detector: Send {
    /// Detections for one frame, in that frame's pixel coordinates
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        (**self).detect(frame)
    }
}
