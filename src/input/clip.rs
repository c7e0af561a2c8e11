/// 内存帧序列 (In-memory clip)
use super::FrameSource;
use crate::error::Result;
use image::RgbImage;

/// A finite, seekable sequence of frames held in memory.
/// Behaves like a decoded video file: reads past the last frame fail.
pub struct MemoryClip {
    frames: Vec<RgbImage>,
    fps: f64,
    position: u64,
    current: Option<usize>,
}

impl MemoryClip {
    pub fn new(frames: Vec<RgbImage>, fps: f64) -> Self {
        Self {
            frames,
            fps,
            position: 0,
            current: None,
        }
    }

    /// Index of the frame most recently returned by `read_next`
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }
}

impl FrameSource for MemoryClip {
    fn read_next(&mut self) -> Result<Option<&RgbImage>> {
        let index = self.position as usize;
        if index >= self.frames.len() {
            return Ok(None);
        }
        self.position += 1;
        self.current = Some(index);
        Ok(self.frames.get(index))
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.position = index.min(self.frames.len() as u64);
        Ok(())
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        self.current.and_then(|i| self.frames.get(i))
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.frames.len() as u64)
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn dimensions(&self) -> (u32, u32) {
        self.frames.first().map(|f| f.dimensions()).unwrap_or((0, 0))
    }
}
