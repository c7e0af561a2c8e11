/// 结果输出 (Where sampling results go)
use crate::analytics::AnalysisResult;
use crate::error::{Error, Result};
use crate::server::{MetricsReport, ServerClient};
use crossbeam_channel::Sender;

pub trait ReportSink: Send {
    fn report(&mut self, result: &AnalysisResult) -> Result<()>;
}

/// Uploads each result to the intersection's `/data` endpoint
pub struct HttpSink {
    client: ServerClient,
    intersection_id: String,
    jpeg_quality: u8,
}

impl HttpSink {
    pub fn new(client: ServerClient, intersection_id: impl Into<String>, jpeg_quality: u8) -> Self {
        Self {
            client,
            intersection_id: intersection_id.into(),
            jpeg_quality,
        }
    }
}

impl ReportSink for HttpSink {
    fn report(&mut self, result: &AnalysisResult) -> Result<()> {
        let report = MetricsReport::from_result(result, self.jpeg_quality)?;
        self.client.post_metrics(&self.intersection_id, &report)
    }
}

/// Forwards results to another thread
pub struct ChannelSink {
    sender: Sender<AnalysisResult>,
}

impl ChannelSink {
    pub fn new(sender: Sender<AnalysisResult>) -> Self {
        Self { sender }
    }
}

impl ReportSink for ChannelSink {
    fn report(&mut self, result: &AnalysisResult) -> Result<()> {
        self.sender
            .send(result.clone())
            .map_err(|_| Error::Transport("result channel closed".into()))
    }
}
