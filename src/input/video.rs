/// 视频文件帧源 (Video file frame source)
///
/// Frames come from a background `Decoder` through a bounded channel.
/// Seeking restarts decoding and skips frames up to the target index; the
/// previous decoder is retired by bumping the generation counter.
use super::decode_filter::DecodeEvent;
use super::decoder::Decoder;
use super::FrameSource;
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver};
use ez_ffmpeg::stream_info::{find_video_stream_info, StreamInfo};
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const FRAME_QUEUE: usize = 4;

pub struct VideoFile {
    url: String,
    fps: f64,
    frame_count: Option<u64>,
    dimensions: (u32, u32),
    generation: Arc<AtomicUsize>,
    frames: Receiver<DecodeEvent>,
    current: Option<RgbImage>,
    position: u64,
    ended: bool,
}

impl VideoFile {
    pub fn open(url: &str) -> Result<Self> {
        let info = find_video_stream_info(url)
            .map_err(|e| Error::Media(format!("{}: {}", url, e)))?
            .ok_or_else(|| Error::Media(format!("{}: no video stream", url)))?;

        let (fps, nb_frames, width, height) = match info {
            StreamInfo::Video {
                fps,
                nb_frames,
                width,
                height,
                ..
            } => (fps as f64, nb_frames as i64, width as i64, height as i64),
            _ => return Err(Error::Media(format!("{}: no video stream", url))),
        };
        if width <= 0 || height <= 0 {
            return Err(Error::Media(format!("{}: invalid size {}x{}", url, width, height)));
        }

        let generation = Arc::new(AtomicUsize::new(0));
        let frames = start_decoder(url, &generation, 0)?;

        log::info!(
            "📹 Opened {} ({}x{}, {:.2} fps, {} frames)",
            url,
            width,
            height,
            fps,
            nb_frames
        );

        Ok(Self {
            url: url.to_string(),
            fps: if fps.is_finite() && fps > 0.0 { fps } else { 25.0 },
            frame_count: (nb_frames > 0).then_some(nb_frames as u64),
            dimensions: (width as u32, height as u32),
            generation,
            frames,
            current: None,
            position: 0,
            ended: false,
        })
    }
}

fn start_decoder(url: &str, generation: &Arc<AtomicUsize>, skip: u64) -> Result<Receiver<DecodeEvent>> {
    let gen = generation.load(Ordering::Relaxed);
    let (tx, rx) = bounded(FRAME_QUEUE);
    Decoder::new(url.to_string(), gen, generation.clone(), skip).spawn(tx)?;
    Ok(rx)
}

impl FrameSource for VideoFile {
    fn read_next(&mut self) -> Result<Option<&RgbImage>> {
        if self.ended {
            return Ok(None);
        }
        match self.frames.recv() {
            Ok(DecodeEvent::Frame(image)) => {
                self.position += 1;
                self.current = Some(image);
                Ok(self.current.as_ref())
            }
            Ok(DecodeEvent::End) | Err(_) => {
                self.ended = true;
                Ok(None)
            }
        }
    }

    fn seek(&mut self, index: u64) -> Result<()> {
        self.generation.fetch_add(1, Ordering::Relaxed);
        // dropping the old receiver unblocks the old decoder
        self.frames = start_decoder(&self.url, &self.generation, index)?;
        self.position = index;
        self.ended = false;
        Ok(())
    }

    fn current_frame(&self) -> Option<&RgbImage> {
        self.current.as_ref()
    }

    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

impl Drop for VideoFile {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }
}
