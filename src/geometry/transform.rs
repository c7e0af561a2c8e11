/// 坐标变换 (Coordinate transform)
///
/// `view = media * scale + pan`. Only media-space points are ever stored;
/// view-space is recomputed every frame from the current scale and pan.
use super::Point2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub pan: Point2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            pan: Point2::default(),
        }
    }

    pub fn new(scale: f32, pan: Point2) -> Self {
        Self { scale, pan }
    }

    /// Fit a `width x height` raster inside a `view_w x view_h` viewport,
    /// never upscaling, anchored top-left.
    pub fn fit(width: u32, height: u32, view_w: f32, view_h: f32) -> Self {
        if width == 0 || height == 0 {
            return Self::identity();
        }
        let scale = (view_w / width as f32)
            .min(view_h / height as f32)
            .min(1.0);
        Self::new(scale, Point2::default())
    }

    pub fn to_media(&self, view: Point2) -> Point2 {
        to_media(view, self.scale, self.pan)
    }

    pub fn to_view(&self, media: Point2) -> Point2 {
        to_view(media, self.scale, self.pan)
    }

    /// Pointer-anchored zoom.
    ///
    /// Multiplies the scale by `factor`, clamped to `[min_scale, max_scale]`, and
    /// re-solves the pan so the media point under `pointer` stays under it.
    /// Returns `false` (and leaves the transform untouched) when the clamp
    /// leaves the scale unchanged.
    pub fn zoom_at(&mut self, pointer: Point2, factor: f32, min_scale: f32, max_scale: f32) -> bool {
        let new_scale = (self.scale * factor).clamp(min_scale, max_scale);
        if (new_scale - self.scale).abs() <= f32::EPSILON {
            return false;
        }
        let anchor = self.to_media(pointer);
        // pointer = anchor * new_scale + pan_new
        self.pan = Point2::new(
            pointer.x - anchor.x * new_scale,
            pointer.y - anchor.y * new_scale,
        );
        self.scale = new_scale;
        true
    }

    /// Pan by a view-space delta (drag)
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }
}

pub fn to_media(view: Point2, scale: f32, pan: Point2) -> Point2 {
    Point2::new((view.x - pan.x) / scale, (view.y - pan.y) / scale)
}

pub fn to_view(media: Point2, scale: f32, pan: Point2) -> Point2 {
    Point2::new(media.x * scale + pan.x, media.y * scale + pan.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn close(a: Point2, b: Point2, tol: f32) -> bool {
        (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
    }

    #[test]
    fn test_identity_round_trip() {
        let t = ViewTransform::identity();
        let p = Point2::new(12.5, 40.0);
        assert_eq!(t.to_view(p), p);
        assert_eq!(t.to_media(p), p);
    }

    #[test]
    fn test_scale_and_pan() {
        let t = ViewTransform::new(2.0, Point2::new(10.0, -5.0));
        let v = t.to_view(Point2::new(3.0, 4.0));
        assert_eq!(v, Point2::new(16.0, 3.0));
        assert!(close(t.to_media(v), Point2::new(3.0, 4.0), 1e-6));
    }

    #[test]
    fn test_zoom_keeps_pointer_anchor() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut t = ViewTransform::new(
                rng.gen_range(0.2..4.0),
                Point2::new(rng.gen_range(-300.0..300.0), rng.gen_range(-300.0..300.0)),
            );
            let pointer = Point2::new(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0));
            let factor = if rng.gen_bool(0.5) { 1.1 } else { 0.9 };
            let before = t.to_media(pointer);
            t.zoom_at(pointer, factor, 0.1, 5.0);
            let after = t.to_media(pointer);
            let tol = 1e-3 * (1.0 + before.x.abs().max(before.y.abs()));
            assert!(close(before, after, tol), "{:?} vs {:?}", before, after);
        }
    }

    #[test]
    fn test_zoom_clamped_to_range() {
        let mut t = ViewTransform::new(4.9, Point2::default());
        assert!(t.zoom_at(Point2::new(100.0, 100.0), 1.1, 0.1, 5.0));
        assert_eq!(t.scale, 5.0);
        // already at the ceiling
        assert!(!t.zoom_at(Point2::new(100.0, 100.0), 1.1, 0.1, 5.0));
        assert_eq!(t.scale, 5.0);
    }

    #[test]
    fn test_fit_never_upscales() {
        let t = ViewTransform::fit(640, 360, 1280.0, 720.0);
        assert_eq!(t.scale, 1.0);
        let t = ViewTransform::fit(1920, 1080, 1280.0, 720.0);
        assert!((t.scale - 2.0 / 3.0).abs() < 1e-6);
    }
}
