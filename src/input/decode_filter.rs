/// FFmpeg解码过滤器模块
/// FFmpeg decode filter: rgb24 AVFrame -> `image::RgbImage`
use crossbeam_channel::Sender;
use ez_ffmpeg::filter::frame_filter::FrameFilter;
use ez_ffmpeg::filter::frame_filter_context::FrameFilterContext;
use ez_ffmpeg::{AVMediaType, Frame};
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Messages from the decoding thread to its `VideoFile`
#[derive(Debug)]
pub enum DecodeEvent {
    Frame(RgbImage),
    End,
}

/// Receives decoded frames (already converted to rgb24 by the filter graph),
/// drops the first `skip` of them, and forwards the rest.
#[derive(Clone)]
pub struct DecodeFilter {
    generation: usize,
    active: Arc<AtomicUsize>,
    skip: u64,
    sender: Sender<DecodeEvent>,
    pub total_frames: u64,
    pub dropped_frames: u64,
}

impl DecodeFilter {
    pub fn new(
        generation: usize,
        active: Arc<AtomicUsize>,
        skip: u64,
        sender: Sender<DecodeEvent>,
    ) -> Self {
        Self {
            generation,
            active,
            skip,
            sender,
            total_frames: 0,
            dropped_frames: 0,
        }
    }
}

impl FrameFilter for DecodeFilter {
    fn media_type(&self) -> AVMediaType {
        AVMediaType::AVMEDIA_TYPE_VIDEO
    }

    fn init(&mut self, _ctx: &FrameFilterContext) -> Result<(), String> {
        log::debug!("✅ Decode thread started (gen {}, skip {})", self.generation, self.skip);
        Ok(())
    }

    fn filter_frame(
        &mut self,
        frame: Frame,
        _ctx: &FrameFilterContext,
    ) -> Result<Option<Frame>, String> {
        // superseded by a seek
        let current_gen = self.active.load(Ordering::Relaxed);
        if self.generation != current_gen {
            return Err(format!(
                "decoder expired (gen {} != {})",
                self.generation, current_gen
            ));
        }

        if unsafe { frame.as_ptr().is_null() || frame.is_empty() } || frame.is_corrupt() {
            self.dropped_frames += 1;
            return Ok(None);
        }
        self.total_frames += 1;

        if self.skip > 0 {
            self.skip -= 1;
            return Ok(None);
        }

        let image = unsafe { rgb24_to_image(&frame) };
        let Some(image) = image else {
            self.dropped_frames += 1;
            return Ok(None);
        };

        // receiver gone means the source was dropped or re-seeked
        self.sender
            .send(DecodeEvent::Frame(image))
            .map_err(|_| "frame receiver closed".to_string())?;

        Ok(Some(frame))
    }

    fn uninit(&mut self, _ctx: &FrameFilterContext) {
        log::debug!(
            "✅ Decode thread exiting (gen {}, {} frames, {} dropped)",
            self.generation,
            self.total_frames,
            self.dropped_frames
        );
    }
}

/// Copy a packed rgb24 frame row by row, honouring the line stride
unsafe fn rgb24_to_image(frame: &Frame) -> Option<RgbImage> {
    let raw = &*frame.as_ptr();
    let (w, h) = (raw.width, raw.height);
    if w <= 0 || h <= 0 || raw.data[0].is_null() {
        return None;
    }
    let (w, h) = (w as usize, h as usize);
    let stride = raw.linesize[0] as usize;
    let row_bytes = w * 3;
    if stride < row_bytes {
        return None;
    }

    let mut buffer = Vec::with_capacity(row_bytes * h);
    for y in 0..h {
        let row = std::slice::from_raw_parts(raw.data[0].add(y * stride), row_bytes);
        buffer.extend_from_slice(row);
    }
    RgbImage::from_raw(w as u32, h as u32, buffer)
}
