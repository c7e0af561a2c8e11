/// 播放控制 (Authoring playback)
///
/// Drives a `FrameSource` at its native rate for the authoring tool. Playback
/// stops at end-of-stream; it never loops. A programmatic seek stays in flight
/// until the next `tick` has published the new position, and slider
/// notifications arriving meanwhile are ignored so a seek cannot trigger another.
use crate::error::{Error, Result};
use crate::input::FrameSource;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Paused, or nothing to play
    Idle,
    /// Next frame not due yet
    Waiting,
    /// A new frame was read; its index
    Frame(u64),
    /// End-of-stream reached, playback stopped
    Ended,
}

#[derive(Debug, Clone)]
pub struct Playback {
    playing: bool,
    fps: f64,
    frame_count: u64,
    index: u64,
    slider: u64,
    seek_in_flight: bool,
    next_due: Option<Instant>,
}

impl Playback {
    pub fn new(source: &dyn FrameSource) -> Self {
        Self {
            playing: false,
            fps: source.fps(),
            frame_count: if source.is_still() {
                0
            } else {
                source.frame_count().unwrap_or(0)
            },
            index: 0,
            slider: 0,
            seek_in_flight: false,
            next_due: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Index of the frame on screen
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Value the position slider should display
    pub fn slider(&self) -> u64 {
        self.slider
    }

    pub fn is_seeking(&self) -> bool {
        self.seek_in_flight
    }

    /// `1000 / fps` milliseconds
    pub fn frame_interval(&self) -> Duration {
        if self.fps > 0.0 {
            Duration::from_secs_f64(1.0 / self.fps)
        } else {
            Duration::from_millis(40)
        }
    }

    pub fn play(&mut self, now: Instant) {
        if self.frame_count == 0 {
            return;
        }
        self.playing = true;
        self.next_due = Some(now + self.frame_interval());
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.next_due = None;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Read the next frame if one is due
    pub fn tick(&mut self, now: Instant, source: &mut dyn FrameSource) -> Result<Tick> {
        // the UI has read `slider()` since the last seek
        self.end_programmatic_seek();
        if !self.playing {
            return Ok(Tick::Idle);
        }
        match self.next_due {
            Some(due) if now < due => return Ok(Tick::Waiting),
            _ => {}
        }

        if source.read_next()?.is_none() {
            log::info!("⏹️  End of video");
            self.pause();
            return Ok(Tick::Ended);
        }
        self.index = source.position().saturating_sub(1);
        self.publish_position();
        self.next_due = Some(now + self.frame_interval());
        Ok(Tick::Frame(self.index))
    }

    /// Slider moved. Ignored while a programmatic seek is running or when the
    /// value matches the frame already shown.
    pub fn on_slider_changed(&mut self, value: u64, source: &mut dyn FrameSource) -> Result<bool> {
        if self.seek_in_flight || value == self.index {
            return Ok(false);
        }
        self.seek(value, source)?;
        Ok(true)
    }

    /// Programmatic seek to `index` and show that frame. On success the seek
    /// stays in flight until the next `tick`.
    pub fn seek(&mut self, index: u64, source: &mut dyn FrameSource) -> Result<()> {
        self.begin_programmatic_seek();
        let result = seek_and_read(index, source);
        match result {
            Ok(()) => {
                self.index = index;
                self.publish_position();
            }
            Err(_) => self.end_programmatic_seek(),
        }
        result
    }

    pub fn begin_programmatic_seek(&mut self) {
        self.seek_in_flight = true;
    }

    pub fn end_programmatic_seek(&mut self) {
        self.seek_in_flight = false;
    }

    fn publish_position(&mut self) {
        self.slider = self.index;
    }
}

fn seek_and_read(index: u64, source: &mut dyn FrameSource) -> Result<()> {
    source.seek(index)?;
    if source.read_next()?.is_none() {
        return Err(Error::Media(format!("no frame at index {}", index)));
    }
    Ok(())
}
