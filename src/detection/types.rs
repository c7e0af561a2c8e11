/// 检测结果数据结构
/// Data structures shared by detectors and the zone classifier
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};

/// 检测框 (Detection bounding box), media pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// 中心点
    pub fn center(&self) -> Point2 {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// 上边中点 (head/shoulder position for pedestrians)
    pub fn top_mid(&self) -> Point2 {
        Point2::new((self.x1 + self.x2) / 2.0, self.y1)
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// One labelled detection on a frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "class", alias = "class_name", alias = "name")]
    pub label: String,
    #[serde(alias = "score", alias = "conf")]
    pub confidence: f32,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_points() {
        let b = BBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(b.center(), Point2::new(20.0, 40.0));
        assert_eq!(b.top_mid(), Point2::new(20.0, 20.0));
        assert_eq!(b.area(), 800.0);
    }

    #[test]
    fn test_bbox_normalises_corners() {
        let b = BBox::new(30.0, 60.0, 10.0, 20.0);
        assert_eq!(b.as_array(), [10.0, 20.0, 30.0, 60.0]);
    }

    #[test]
    fn test_detection_aliases() {
        let d: Detection = serde_json::from_str(
            r#"{"class":"bus","score":0.8,"bbox":{"x1":0,"y1":0,"x2":5,"y2":5}}"#,
        )
        .unwrap();
        assert_eq!(d.label, "bus");
        assert_eq!(d.confidence, 0.8);
    }
}
