/// 服务端通信 (Config fetch and report upload)
use super::schema::parse_cameras;
use crate::analytics::{AnalysisResult, CameraConfig};
use crate::error::Result;
use crate::utils::encode_jpeg_base64;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-cycle metrics payload, `POST {server}/{intersection}/data`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub camera_name: String,
    pub densities: BTreeMap<String, f64>,
    pub pollution_score: f64,
    pub pedestrian_waiting: bool,
    pub annotated_frame: String,
}

impl MetricsReport {
    pub fn from_result(result: &AnalysisResult, jpeg_quality: u8) -> Result<Self> {
        Ok(Self {
            camera_name: result.camera_name.clone(),
            densities: result.densities.clone(),
            pollution_score: result.pollution_score,
            pedestrian_waiting: result.pedestrian_waiting,
            annotated_frame: encode_jpeg_base64(&result.annotated_frame, jpeg_quality)?,
        })
    }
}

/// Red-light violation payload, produced outside the zone pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationReport {
    pub intersection_id: String,
    pub intersection_name: String,
    pub camera_name: String,
    pub license_plate: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ServerClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn intersection_url(&self, intersection_id: &str) -> String {
        format!("{}/{}", self.base_url, intersection_id)
    }

    pub fn metrics_url(&self, intersection_id: &str) -> String {
        format!("{}/data", self.intersection_url(intersection_id))
    }

    /// `GET {server}/{intersection}` -> normalised camera list
    pub fn fetch_cameras(&self, intersection_id: &str) -> Result<Vec<CameraConfig>> {
        let url = self.intersection_url(intersection_id);
        log::info!("📡 Fetching configuration from {}", url);
        let body = self.agent.get(&url).call()?.into_string()?;
        parse_cameras(&body)
    }

    pub fn post_metrics(&self, intersection_id: &str, report: &MetricsReport) -> Result<()> {
        self.agent
            .post(&self.metrics_url(intersection_id))
            .set("Content-Type", "application/json")
            .send_json(report)?;
        Ok(())
    }

    /// Violations go to their own endpoint, not under the intersection URL
    pub fn post_violation(&self, endpoint: &str, report: &ViolationReport) -> Result<()> {
        self.agent
            .post(endpoint)
            .set("Content-Type", "application/json")
            .send_json(report)?;
        log::info!(
            "🚨 Violation reported: {} at {}",
            report.license_plate,
            report.camera_name
        );
        Ok(())
    }
}
