//! 区域绘制会话 (ROI authoring session)
//!
//! One session per authoring window. It owns the stroke, the confirmed
//! polygon, the edit mode and the view transform; nothing here is global.
//! Input handling is split in two steps:
//! - `InteractionState::next` is a pure transition over `(phase, mode)`
//! - `RoiSession` applies the effect of the transition to the stroke
//!
//! Rendering reads `RoiSession::overlay()` and never mutates the session.

use crate::analytics::{Roi, RoiKind};
use crate::error::Result;
use crate::geometry::{simplify_stroke, Point2, ViewTransform};
use crate::settings::EditorSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Draw,
    Erase,
}

impl EditMode {
    pub fn label(&self) -> &'static str {
        match self {
            EditMode::Draw => "DRAW",
            EditMode::Erase => "ERASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Drawing,
    Erasing,
}

/// Pointer input, in view-space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point2),
    Move(Point2),
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionState {
    pub phase: Phase,
    pub mode: EditMode,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            mode: EditMode::Draw,
        }
    }
}

impl InteractionState {
    /// Pure transition for a pointer event
    pub fn next(self, event: &PointerEvent) -> Self {
        let phase = match (self.phase, event) {
            (Phase::Idle, PointerEvent::Press(_)) => match self.mode {
                EditMode::Draw => Phase::Drawing,
                EditMode::Erase => Phase::Erasing,
            },
            (_, PointerEvent::Release) => Phase::Idle,
            (phase, _) => phase,
        };
        Self { phase, ..self }
    }

    /// Mode switches are allowed mid-gesture; the active gesture follows the new mode.
    pub fn with_mode(self, mode: EditMode) -> Self {
        let phase = match self.phase {
            Phase::Idle => Phase::Idle,
            _ if mode == EditMode::Draw => Phase::Drawing,
            _ => Phase::Erasing,
        };
        Self { phase, mode }
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }
}

/// What the renderer needs, already projected into view-space
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub stroke: Vec<Point2>,
    pub polygon: Option<Vec<Point2>>,
    pub mode: EditMode,
    pub erase_radius: f32,
}

pub struct RoiSession {
    state: InteractionState,
    stroke: Vec<Point2>,
    simplified: Option<Vec<Point2>>,
    view: ViewTransform,
    erase_radius_px: f32,
    simplify_ratio: f64,
}

impl RoiSession {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            state: InteractionState::default(),
            stroke: Vec::new(),
            simplified: None,
            view: ViewTransform::identity(),
            erase_radius_px: settings.erase_radius_px,
            simplify_ratio: settings.simplify_ratio,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> EditMode {
        self.state.mode
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.state = self.state.with_mode(mode);
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn stroke(&self) -> &[Point2] {
        &self.stroke
    }

    pub fn simplified(&self) -> Option<&[Point2]> {
        self.simplified.as_deref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    /// Erase radius in media pixels. Constant on screen, so it shrinks as you zoom in.
    pub fn media_erase_radius(&self) -> f32 {
        self.erase_radius_px / self.view.scale
    }

    /// Feed a view-space pointer event through the state machine
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(p) => {
                let media = self.view.to_media(p);
                self.begin(media);
            }
            PointerEvent::Move(p) => {
                let media = self.view.to_media(p);
                self.continue_stroke(media);
            }
            PointerEvent::Release => self.end(),
        }
    }

    /// Press. Only Draw mode records the point; erasing starts with the first move.
    pub fn begin(&mut self, media: Point2) {
        self.state = self.state.next(&PointerEvent::Press(media));
        if self.state.phase == Phase::Drawing {
            self.append(media);
        }
    }

    pub fn continue_stroke(&mut self, media: Point2) {
        match self.state.phase {
            Phase::Idle => {}
            Phase::Drawing => self.append(media),
            Phase::Erasing => {
                self.erase_at(media);
            }
        }
    }

    pub fn end(&mut self) {
        self.state = self.state.next(&PointerEvent::Release);
    }

    /// Remove every stroke point within the erase radius of `media`.
    /// Returns how many points were removed.
    pub fn erase_at(&mut self, media: Point2) -> usize {
        let radius = self.media_erase_radius();
        let before = self.stroke.len();
        self.stroke.retain(|p| p.distance(&media) > radius);
        let removed = before - self.stroke.len();
        if removed > 0 {
            self.simplified = None;
        }
        removed
    }

    fn append(&mut self, media: Point2) {
        self.stroke.push(media);
        self.simplified = None;
    }

    pub fn reset(&mut self) {
        self.stroke.clear();
        self.simplified = None;
        self.state = InteractionState {
            phase: Phase::Idle,
            ..self.state
        };
        log::info!("Drawing has been reset.");
    }

    /// Simplify the current stroke into the confirmed polygon.
    /// With fewer than 3 points nothing changes and the error is returned for display.
    pub fn confirm(&mut self) -> Result<&[Point2]> {
        let polygon = simplify_stroke(&self.stroke, self.simplify_ratio)?;
        log::info!(
            "Simplified {} stroke points to {} vertices",
            self.stroke.len(),
            polygon.len()
        );
        Ok(self.simplified.insert(polygon).as_slice())
    }

    /// The confirmed polygon as integer `[x, y]` media pixels
    pub fn polygon_pixels(&self) -> Option<Vec<[i32; 2]>> {
        self.simplified
            .as_ref()
            .map(|poly| poly.iter().map(Point2::to_pixel).collect())
    }

    pub fn to_roi(&self, name: &str, kind: RoiKind) -> Option<Roi> {
        self.polygon_pixels().map(|pixels| {
            Roi::new(
                name,
                kind,
                pixels.into_iter().map(Point2::from_pixel).collect(),
            )
        })
    }

    pub fn overlay(&self) -> Overlay {
        Overlay {
            stroke: self.stroke.iter().map(|p| self.view.to_view(*p)).collect(),
            polygon: self
                .simplified
                .as_ref()
                .map(|poly| poly.iter().map(|p| self.view.to_view(*p)).collect()),
            mode: self.state.mode,
            erase_radius: self.erase_radius_px,
        }
    }
}
