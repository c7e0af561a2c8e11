/// 区域分类 (Zone classifier)
///
/// Traffic zones: a detection counts when its box centre is inside the
/// polygon. Density is the share of the zone's raster mask covered by the
/// union of those boxes, so overlapping vehicles are not counted twice.
///
/// Pedestrian zones: a detection counts when the midpoint of its box's top
/// edge is inside the polygon.
use super::annotate::Annotator;
use super::roi::{Roi, RoiKind};
use crate::detection::Detection;
use crate::geometry::polygon::{count_nonzero, intersection_count};
use crate::geometry::{contains_point, rasterize_boxes, rasterize_polygon};
use crate::settings::AnalyticsSettings;
use image::RgbImage;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneValue {
    Traffic {
        density: f64,
        pollution: f64,
        vehicles: usize,
    },
    Pedestrian {
        waiting: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMetric {
    pub name: String,
    pub value: ZoneValue,
}

/// Everything computed for one sampling tick of one camera
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub camera_name: String,
    pub densities: BTreeMap<String, f64>,
    pub zone_pollution: BTreeMap<String, f64>,
    pub pollution_score: f64,
    pub pedestrian_counts: BTreeMap<String, usize>,
    pub pedestrian_waiting: bool,
    pub zones: Vec<ZoneMetric>,
    pub annotated_frame: RgbImage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficMetric {
    pub density: f64,
    pub pollution: f64,
    pub vehicles: usize,
}

/// Density and pollution for one traffic zone.
/// `None` for a zero-area polygon or one that covers no pixel of the frame.
pub fn classify_traffic(
    roi: &Roi,
    frame_size: (u32, u32),
    detections: &[Detection],
    settings: &AnalyticsSettings,
) -> Option<TrafficMetric> {
    if roi.is_degenerate() {
        return None;
    }
    let (width, height) = frame_size;
    let zone_mask = rasterize_polygon(&roi.polygon, width, height);
    let zone_pixels = count_nonzero(&zone_mask);
    if zone_pixels == 0 {
        return None;
    }

    let in_zone: Vec<&Detection> = detections
        .iter()
        .filter(|d| d.confidence >= settings.min_confidence)
        .filter(|d| settings.is_traffic_class(&d.label))
        .filter(|d| contains_point(&roi.polygon, d.bbox.center()))
        .collect();

    let boxes: Vec<[f32; 4]> = in_zone.iter().map(|d| d.bbox.as_array()).collect();
    let occupied = rasterize_boxes(&boxes, width, height);
    let covered = intersection_count(&zone_mask, &occupied);

    Some(TrafficMetric {
        density: covered as f64 / zone_pixels as f64 * 100.0,
        pollution: in_zone.iter().map(|d| settings.weight(&d.label)).sum(),
        vehicles: in_zone.len(),
    })
}

/// Number of people whose head position is inside the zone
pub fn classify_pedestrian(roi: &Roi, detections: &[Detection], settings: &AnalyticsSettings) -> usize {
    detections
        .iter()
        .filter(|d| d.confidence >= settings.min_confidence)
        .filter(|d| d.label == settings.pedestrian_class)
        .filter(|d| contains_point(&roi.polygon, d.bbox.top_mid()))
        .count()
}

/// Run every zone of a camera against one frame's detections
pub fn analyze_frame(
    camera_name: &str,
    rois: &[Roi],
    frame: &RgbImage,
    detections: &[Detection],
    settings: &AnalyticsSettings,
    annotator: &Annotator,
) -> AnalysisResult {
    let mut annotated = frame.clone();
    let mut result = AnalysisResult {
        camera_name: camera_name.to_string(),
        densities: BTreeMap::new(),
        zone_pollution: BTreeMap::new(),
        pollution_score: 0.0,
        pedestrian_counts: BTreeMap::new(),
        pedestrian_waiting: false,
        zones: Vec::with_capacity(rois.len()),
        annotated_frame: RgbImage::new(0, 0),
    };

    for roi in rois {
        let value = match roi.kind {
            RoiKind::Traffic => {
                let Some(metric) = classify_traffic(roi, frame.dimensions(), detections, settings) else {
                    log::debug!("[{}] zone '{}' has no area, skipped", camera_name, roi.name);
                    continue;
                };
                result.densities.insert(roi.name.clone(), metric.density);
                result.zone_pollution.insert(roi.name.clone(), metric.pollution);
                result.pollution_score += metric.pollution;
                ZoneValue::Traffic {
                    density: metric.density,
                    pollution: metric.pollution,
                    vehicles: metric.vehicles,
                }
            }
            RoiKind::Pedestrian => {
                let waiting = classify_pedestrian(roi, detections, settings);
                result.pedestrian_counts.insert(roi.name.clone(), waiting);
                result.pedestrian_waiting |= waiting > 0;
                ZoneValue::Pedestrian { waiting }
            }
        };
        annotator.draw_zone(&mut annotated, roi, &value);
        result.zones.push(ZoneMetric {
            name: roi.name.clone(),
            value,
        });
    }

    result.annotated_frame = annotated;
    result
}
