/// 几何工具 (Geometry)
///
/// - transform: media-space <-> view-space mapping under zoom/pan
/// - polygon:   point-in-polygon, area, raster masks
/// - simplify:  freehand stroke -> closed polygon
pub mod polygon;
pub mod simplify;
pub mod transform;

pub use polygon::{contains_point, polygon_area, rasterize_boxes, rasterize_polygon, Mask};
pub use simplify::simplify_stroke;
pub use transform::ViewTransform;

use serde::{Deserialize, Serialize};

/// A 2D point. Which space it lives in (media or view) is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Integer media pixel, as stored in camera configs
    pub fn to_pixel(&self) -> [i32; 2] {
        [self.x.round() as i32, self.y.round() as i32]
    }

    pub fn from_pixel(p: [i32; 2]) -> Self {
        Self::new(p[0] as f32, p[1] as f32)
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}
