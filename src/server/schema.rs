/// 摄像头配置格式 (Camera config schemas)
///
/// The configuration service has shipped two ROI layouts:
/// - typed:  `rois: [{name, type, points: [[x, y], ...]}]`
/// - legacy: `roiPolygons: {laneName: [[x, y], ...]}` (all Traffic)
///
/// Each layout is a `RoiAdapter`. The server stores both keys, with an empty
/// `rois: []` on legacy cameras and a generated `roiPolygons` on typed ones,
/// so an adapter only matches a non-empty layout. Adapters are tried in order
/// and the first one that yields usable ROIs wins; the classifier only ever
/// sees `Roi`.
use crate::analytics::{CameraConfig, Roi, RoiKind};
use crate::error::{Error, Result};
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCamera {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub video_source: Option<String>,
    #[serde(default)]
    pub rois: Option<Vec<RawRoi>>,
    #[serde(default)]
    pub roi_polygons: Option<BTreeMap<String, Vec<[f64; 2]>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoi {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub points: Option<Vec<[f64; 2]>>,
}

/// `{name, type, points}`: one ROI in the typed layout, as written by the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoiKind,
    pub points: Vec<[i32; 2]>,
}

impl From<&Roi> for RoiRecord {
    fn from(roi: &Roi) -> Self {
        Self {
            name: roi.name.clone(),
            kind: roi.kind,
            points: roi.pixel_points(),
        }
    }
}

pub trait RoiAdapter: Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, camera: &RawCamera) -> bool;

    /// Usable ROIs only; malformed entries are dropped with a warning
    fn extract(&self, camera_name: &str, camera: &RawCamera) -> Vec<Roi>;
}

pub struct TypedRois;

pub struct LegacyRoiPolygons;

pub static ADAPTERS: [&dyn RoiAdapter; 2] = [&TypedRois, &LegacyRoiPolygons];

impl RoiAdapter for TypedRois {
    fn name(&self) -> &'static str {
        "rois"
    }

    fn matches(&self, camera: &RawCamera) -> bool {
        camera.rois.as_ref().is_some_and(|r| !r.is_empty())
    }

    fn extract(&self, camera_name: &str, camera: &RawCamera) -> Vec<Roi> {
        let Some(rois) = &camera.rois else {
            return Vec::new();
        };
        rois.iter()
            .enumerate()
            .filter_map(|(i, raw)| {
                let name = raw.name.clone().filter(|n| !n.is_empty());
                let kind = raw.kind.as_deref().map(str::parse::<RoiKind>);
                match (name, kind, raw.points.as_deref()) {
                    (Some(name), Some(Ok(kind)), Some(points)) => {
                        polygon_from(camera_name, &name, points).map(|p| Roi::new(name, kind, p))
                    }
                    (_, Some(Err(e)), _) => {
                        log::warn!("[{}] ROI #{} skipped: {}", camera_name, i, e);
                        None
                    }
                    _ => {
                        log::warn!("[{}] ROI #{} skipped: missing name, type or points", camera_name, i);
                        None
                    }
                }
            })
            .collect()
    }
}

impl RoiAdapter for LegacyRoiPolygons {
    fn name(&self) -> &'static str {
        "roiPolygons"
    }

    fn matches(&self, camera: &RawCamera) -> bool {
        camera.roi_polygons.as_ref().is_some_and(|r| !r.is_empty())
    }

    fn extract(&self, camera_name: &str, camera: &RawCamera) -> Vec<Roi> {
        let Some(lanes) = &camera.roi_polygons else {
            return Vec::new();
        };
        lanes
            .iter()
            .filter_map(|(lane, points)| {
                polygon_from(camera_name, lane, points).map(|p| Roi::new(lane.clone(), RoiKind::Traffic, p))
            })
            .collect()
    }
}

fn polygon_from(camera_name: &str, roi_name: &str, points: &[[f64; 2]]) -> Option<Vec<Point2>> {
    if points.len() < 3 {
        log::warn!(
            "[{}] ROI '{}' skipped: {} points (< 3)",
            camera_name,
            roi_name,
            points.len()
        );
        return None;
    }
    Some(points.iter().map(|[x, y]| Point2::new(*x as f32, *y as f32)).collect())
}

/// Normalise one camera entry. Fails when the camera cannot run.
pub fn normalize_camera(raw: &RawCamera) -> Result<CameraConfig> {
    let name = raw
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::Config("camera without a name".into()))?;
    let video_source = raw
        .video_source
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("camera '{}' has no videoSource", name)))?;

    let mut tried = Vec::new();
    for adapter in ADAPTERS.iter().filter(|a| a.matches(raw)) {
        let rois = adapter.extract(&name, raw);
        if !rois.is_empty() {
            log::debug!("[{}] {} ROI(s) from '{}'", name, rois.len(), adapter.name());
            return Ok(CameraConfig {
                name,
                video_source,
                rois,
            });
        }
        tried.push(adapter.name());
    }

    if tried.is_empty() && raw.rois.is_none() && raw.roi_polygons.is_none() {
        return Err(Error::Schema { camera: name });
    }
    Err(Error::Config(format!(
        "camera '{}' has no usable ROI (tried: {})",
        name,
        tried.join(", ")
    )))
}

/// Parse a `{cameras: [...]}` response. Unusable cameras are skipped.
pub fn parse_cameras(body: &str) -> Result<Vec<CameraConfig>> {
    let root: Value = serde_json::from_str(body)?;
    let entries = match &root {
        Value::Object(map) => map.get("cameras").and_then(Value::as_array),
        Value::Array(list) => Some(list),
        _ => None,
    };
    let Some(entries) = entries else {
        return Ok(Vec::new());
    };

    let mut cameras = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let raw: RawCamera = match serde_json::from_value(entry.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("⚠️  Camera #{} malformed, skipping: {}", i, e);
                continue;
            }
        };
        match normalize_camera(&raw) {
            Ok(camera) => cameras.push(camera),
            Err(e) => log::warn!("⚠️  Camera #{} skipped: {}", i, e),
        }
    }
    Ok(cameras)
}
