/// 区域定义 (Zone definitions)
use crate::geometry::{polygon_area, Point2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoiKind {
    Traffic,
    Pedestrian,
}

impl RoiKind {
    pub fn name(&self) -> &'static str {
        match self {
            RoiKind::Traffic => "Traffic",
            RoiKind::Pedestrian => "Pedestrian",
        }
    }
}

impl fmt::Display for RoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoiKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "traffic" => Ok(RoiKind::Traffic),
            "pedestrian" => Ok(RoiKind::Pedestrian),
            other => Err(format!("unknown ROI type '{}'", other)),
        }
    }
}

/// A named, typed polygon in media-space
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    pub name: String,
    pub kind: RoiKind,
    pub polygon: Vec<Point2>,
}

impl Roi {
    pub fn new(name: impl Into<String>, kind: RoiKind, polygon: Vec<Point2>) -> Self {
        Self {
            name: name.into(),
            kind,
            polygon,
        }
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.polygon)
    }

    /// Zero enclosed area; such zones never contribute density
    pub fn is_degenerate(&self) -> bool {
        self.area() == 0.0
    }

    pub fn pixel_points(&self) -> Vec<[i32; 2]> {
        self.polygon.iter().map(Point2::to_pixel).collect()
    }
}

/// One camera's immutable worker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub name: String,
    pub video_source: String,
    pub rois: Vec<Roi>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Traffic".parse::<RoiKind>(), Ok(RoiKind::Traffic));
        assert_eq!("pedestrian".parse::<RoiKind>(), Ok(RoiKind::Pedestrian));
        assert!("lane".parse::<RoiKind>().is_err());
    }

    #[test]
    fn test_degenerate() {
        let flat = Roi::new(
            "flat",
            RoiKind::Traffic,
            vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)],
        );
        assert!(flat.is_degenerate());
    }
}
