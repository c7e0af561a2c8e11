/// 本地视频文件解码器 (CPU软件解码)
use super::decode_filter::{DecodeEvent, DecodeFilter};
use ez_ffmpeg::core::context::null_output::create_null_output;
use ez_ffmpeg::filter::frame_pipeline_builder::FramePipelineBuilder;
use ez_ffmpeg::{AVMediaType, FfmpegContext, Input};
use crossbeam_channel::Sender;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One decoding pass over a file, starting `skip` frames in
pub struct Decoder {
    url: String,
    generation: usize,
    active: Arc<AtomicUsize>,
    skip: u64,
}

impl Decoder {
    pub fn new(url: String, generation: usize, active: Arc<AtomicUsize>, skip: u64) -> Self {
        Self {
            url,
            generation,
            active,
            skip,
        }
    }

    /// Decode on a dedicated thread. `DecodeEvent::End` is sent when the pass finishes.
    pub fn spawn(self, sender: Sender<DecodeEvent>) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("decode-{}", self.generation))
            .spawn(move || self.run(sender))
    }

    fn run(self, sender: Sender<DecodeEvent>) {
        log::debug!("🎬 Decoding {} (gen {})", self.url, self.generation);
        let filter = DecodeFilter::new(self.generation, self.active.clone(), self.skip, sender.clone());
        if let Err(e) = software_decode(&self.url, filter) {
            log::warn!("❌ Decoding {} failed: {}", self.url, e);
        }
        // the receiver may already be gone after a seek
        let _ = sender.send(DecodeEvent::End);
    }
}

fn software_decode(url: &str, filter: DecodeFilter) -> Result<(), String> {
    let pipe: FramePipelineBuilder = AVMediaType::AVMEDIA_TYPE_VIDEO.into();
    let pipe = pipe.filter("decode", Box::new(filter));
    let out = create_null_output().add_frame_pipeline(pipe);

    let input = Input::new(url);

    let ctx = FfmpegContext::builder()
        .input(input)
        .filter_descs(["format=rgb24"].into())
        .output(out)
        .build()
        .map_err(|e| format!("build failed: {}", e))?;

    let sch = ctx.start().map_err(|e| format!("start failed: {}", e))?;
    let _ = sch.wait();
    Ok(())
}
