use super::FrameSource;
use crate::error::Result;
use image::RgbImage;
use std::path::Path;

/// A single raster. Every read returns it; seeking does nothing.
pub struct StillImage {
    image: RgbImage,
}

impl StillImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(image::open(path)?.to_rgb8()))
    }
}

impl FrameSource for StillImage {
    fn read_next(&mut self) -> Result<Option<&RgbImage>> {
        Ok(Some(&self.image))
    }

    fn seek(&mut self, _index: u64) -> Result<()> {
        Ok(())
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        Some(&self.image)
    }

    fn frame_count(&self) -> Option<u64> {
        Some(1)
    }

    fn fps(&self) -> f64 {
        0.0
    }

    fn position(&self) -> u64 {
        0
    }

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn is_still(&self) -> bool {
        true
    }
}
