/// HTTP 检测服务客户端
use super::{Detection, Detector};
use crate::error::Result;
use crate::utils::encode_jpeg_base64;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Sends each frame as a base64 JPEG and reads back labelled boxes
#[derive(Clone)]
pub struct RemoteDetector {
    agent: ureq::Agent,
    url: String,
    jpeg_quality: u8,
}

impl RemoteDetector {
    pub fn new(url: impl Into<String>, jpeg_quality: u8) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            url: url.into(),
            jpeg_quality,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Detector for RemoteDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let image = encode_jpeg_base64(frame, self.jpeg_quality)?;
        let body = DetectRequest {
            image: &image,
            width: frame.width(),
            height: frame.height(),
        };
        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_json(&body)?;
        let text = response.into_string()?;
        let parsed: DetectResponse = serde_json::from_str(&text)?;
        log::debug!("{} detections from {}", parsed.detections.len(), self.url);
        Ok(parsed.detections)
    }
}
