/// 视频输入系统 (Frame sources)
///
/// - StillImage: 单张图片, seek 无效
/// - MemoryClip: 内存中的有限帧序列
/// - VideoFile:  ez-ffmpeg 后台解码线程 + DecodeFilter
///
/// Sources never loop on their own. End-of-stream is `Ok(None)` from
/// `read_next`; looping is up to the caller.
pub mod clip;
pub mod decode_filter;
pub mod decoder;
pub mod still;
pub mod video;

pub use clip::MemoryClip;
pub use decode_filter::{DecodeEvent, DecodeFilter};
pub use decoder::Decoder;
pub use still::StillImage;
pub use video::VideoFile;

use crate::error::Result;
use image::RgbImage;
use std::path::Path;

const STILL_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

pub trait FrameSource: Send {
    /// Next frame, or `None` once the stream is exhausted
    fn read_next(&mut self) -> Result<Option<&RgbImage>>;

    /// Reposition so the next read returns frame `index`
    fn seek(&mut self, index: u64) -> Result<()>;

    fn current_frame(&self) -> Option<&RgbImage>;

    fn frame_count(&self) -> Option<u64>;

    fn fps(&self) -> f64;

    /// Index of the frame the next `read_next` returns
    fn position(&self) -> u64;

    fn dimensions(&self) -> (u32, u32);

    fn is_still(&self) -> bool {
        false
    }
}

pub fn is_still_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| STILL_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open a still image or a video by file extension
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if is_still_path(path) {
        log::info!("🖼️  Loading image {}", path.display());
        Ok(Box::new(StillImage::open(path)?))
    } else {
        Ok(Box::new(VideoFile::open(&path.to_string_lossy())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn clip(n: usize) -> MemoryClip {
        let frames = (0..n)
            .map(|i| RgbImage::from_pixel(4, 3, Rgb([i as u8, 0, 0])))
            .collect();
        MemoryClip::new(frames, 25.0)
    }

    #[test]
    fn test_clip_reads_until_end() {
        let mut c = clip(3);
        for i in 0..3u8 {
            let f = c.read_next().unwrap().unwrap();
            assert_eq!(f.get_pixel(0, 0).0[0], i);
        }
        assert!(c.read_next().unwrap().is_none());
        // no auto-loop
        assert!(c.read_next().unwrap().is_none());
        assert_eq!(c.current_frame().unwrap().get_pixel(0, 0).0[0], 2);
    }

    #[test]
    fn test_clip_seek() {
        let mut c = clip(10);
        c.seek(7).unwrap();
        assert_eq!(c.position(), 7);
        assert_eq!(c.read_next().unwrap().unwrap().get_pixel(0, 0).0[0], 7);
        c.seek(100).unwrap();
        assert!(c.read_next().unwrap().is_none());
        c.seek(0).unwrap();
        assert_eq!(c.read_next().unwrap().unwrap().get_pixel(0, 0).0[0], 0);
        assert_eq!(c.current_index(), Some(0));
    }

    #[test]
    fn test_still_ignores_seek() {
        let mut s = StillImage::new(RgbImage::from_pixel(8, 6, Rgb([9, 9, 9])));
        s.seek(42).unwrap();
        assert_eq!(s.position(), 0);
        assert!(s.read_next().unwrap().is_some());
        assert!(s.read_next().unwrap().is_some());
        assert_eq!(s.dimensions(), (8, 6));
        assert!(s.is_still());
    }

    #[test]
    fn test_still_extension_detection() {
        assert!(is_still_path(Path::new("a/b/frame.PNG")));
        assert!(is_still_path(Path::new("x.jpeg")));
        assert!(!is_still_path(Path::new("cam1.mp4")));
        assert!(!is_still_path(Path::new("noext")));
    }
}
