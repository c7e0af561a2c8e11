/// 结果叠加绘制 (Frame annotation)
use super::roi::{Roi, RoiKind};
use super::zone::ZoneValue;
use crate::error::{Error, Result};
use crate::settings::AnalyticsSettings;
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

const TRAFFIC: Rgb<u8> = Rgb([0, 0, 255]);
const OCCUPIED: Rgb<u8> = Rgb([255, 0, 0]);
const IDLE: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

const LINE_WIDTH: i32 = 3;
const TEXT_OFFSET: f32 = 10.0;

/// Draws zone outlines and their metric text. Text needs a font; without one
/// only outlines are drawn.
#[derive(Clone)]
pub struct Annotator {
    font: Option<FontArc>,
    scale: PxScale,
}

impl Annotator {
    pub fn plain() -> Self {
        Self {
            font: None,
            scale: PxScale::from(20.0),
        }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            ..Self::plain()
        }
    }

    pub fn from_settings(settings: &AnalyticsSettings) -> Result<Self> {
        let Some(path) = settings.font_path.as_deref() else {
            return Ok(Self::plain());
        };
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| Error::Config(format!("font {}: {}", path, e)))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn draw_zone(&self, frame: &mut RgbImage, roi: &Roi, value: &ZoneValue) {
        let color = match (roi.kind, value) {
            (RoiKind::Pedestrian, ZoneValue::Pedestrian { waiting }) if *waiting > 0 => OCCUPIED,
            (RoiKind::Pedestrian, _) => IDLE,
            (RoiKind::Traffic, _) => TRAFFIC,
        };
        draw_outline(frame, &roi.polygon_f32(), color);

        if let (Some(font), Some(first)) = (&self.font, roi.polygon.first()) {
            let text = label(&roi.name, value);
            let x = first.x.round() as i32;
            let y = (first.y - TEXT_OFFSET - self.scale.y).round() as i32;
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                draw_text_mut(frame, TEXT_OUTLINE, x + dx, y + dy, self.scale, font, &text);
            }
            draw_text_mut(frame, TEXT, x, y, self.scale, font, &text);
        }
    }
}

pub fn label(name: &str, value: &ZoneValue) -> String {
    match value {
        ZoneValue::Traffic { density, .. } => format!("{}: {:.1}%", name, density),
        ZoneValue::Pedestrian { waiting } => format!("{}: {} waiting", name, waiting),
    }
}

/// Closed polyline, `LINE_WIDTH` pixels thick
fn draw_outline(frame: &mut RgbImage, polygon: &[(f32, f32)], color: Rgb<u8>) {
    if polygon.len() < 2 {
        return;
    }
    let half = LINE_WIDTH / 2;
    for (i, &start) in polygon.iter().enumerate() {
        let end = polygon[(i + 1) % polygon.len()];
        for ox in -half..=half {
            for oy in -half..=half {
                let (ox, oy) = (ox as f32, oy as f32);
                draw_line_segment_mut(
                    frame,
                    (start.0 + ox, start.1 + oy),
                    (end.0 + ox, end.1 + oy),
                    color,
                );
            }
        }
    }
}

impl Roi {
    fn polygon_f32(&self) -> Vec<(f32, f32)> {
        self.polygon.iter().map(|p| (p.x, p.y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;

    fn roi(kind: RoiKind) -> Roi {
        Roi::new(
            "lane",
            kind,
            vec![
                Point2::new(10.0, 10.0),
                Point2::new(50.0, 10.0),
                Point2::new(50.0, 50.0),
                Point2::new(10.0, 50.0),
            ],
        )
    }

    #[test]
    fn test_labels() {
        let v = ZoneValue::Traffic {
            density: 25.04,
            pollution: 3.0,
            vehicles: 1,
        };
        assert_eq!(label("North", &v), "North: 25.0%");
        assert_eq!(label("Cross", &ZoneValue::Pedestrian { waiting: 2 }), "Cross: 2 waiting");
    }

    #[test]
    fn test_outline_colors() {
        let a = Annotator::plain();
        let mut frame = RgbImage::new(64, 64);
        a.draw_zone(&mut frame, &roi(RoiKind::Traffic), &ZoneValue::Traffic { density: 0.0, pollution: 0.0, vehicles: 0 });
        assert_eq!(*frame.get_pixel(30, 10), TRAFFIC);
        assert_eq!(*frame.get_pixel(30, 30), Rgb([0, 0, 0]));

        let mut frame = RgbImage::new(64, 64);
        a.draw_zone(&mut frame, &roi(RoiKind::Pedestrian), &ZoneValue::Pedestrian { waiting: 1 });
        assert_eq!(*frame.get_pixel(50, 30), OCCUPIED);

        let mut frame = RgbImage::new(64, 64);
        a.draw_zone(&mut frame, &roi(RoiKind::Pedestrian), &ZoneValue::Pedestrian { waiting: 0 });
        assert_eq!(*frame.get_pixel(10, 30), IDLE);
    }

    #[test]
    fn test_missing_font_file() {
        let settings = AnalyticsSettings {
            font_path: Some("/nonexistent/font.ttf".into()),
            ..Default::default()
        };
        assert!(Annotator::from_settings(&settings).is_err());
        assert!(!Annotator::from_settings(&AnalyticsSettings::default()).unwrap().has_font());
    }
}
