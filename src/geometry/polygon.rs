/// 多边形运算 (Polygon operations)
///
/// Rasterisation samples pixel centres: pixel `(x, y)` is set when
/// `(x + 0.5, y + 0.5)` lies inside the shape. An axis-aligned square from
/// `(0,0)` to `(100,100)` therefore covers exactly 100 x 100 pixels.
use super::Point2;
use image::{GrayImage, Luma};

pub type Mask = GrayImage;

const ON: Luma<u8> = Luma([255]);
const EDGE_EPS: f32 = 1e-4;

/// Point-in-polygon test, boundary inclusive. The polygon is implicitly closed.
pub fn contains_point(polygon: &[Point2], p: Point2) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];

        if on_segment(a, b, p) {
            return true;
        }

        if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let len = a.distance(&b).max(1.0);
    if cross.abs() > EDGE_EPS * len {
        return false;
    }
    p.x >= a.x.min(b.x) - EDGE_EPS
        && p.x <= a.x.max(b.x) + EDGE_EPS
        && p.y >= a.y.min(b.y) - EDGE_EPS
        && p.y <= a.y.max(b.y) + EDGE_EPS
}

/// Enclosed area (shoelace), always non-negative
pub fn polygon_area(polygon: &[Point2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0f64;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[j], polygon[i]);
        twice += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
        j = i;
    }
    (twice / 2.0).abs()
}

/// Scanline fill of a closed polygon into a `width x height` binary mask
pub fn rasterize_polygon(polygon: &[Point2], width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width, height);
    if polygon.len() < 3 || width == 0 || height == 0 {
        return mask;
    }

    let min_y = polygon.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = polygon.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let row_start = first_covered(min_y).max(0);
    let row_end = last_covered(max_y).min(height as i64 - 1);

    let mut crossings: Vec<f32> = Vec::with_capacity(polygon.len());
    for row in row_start..=row_end {
        let yc = row as f32 + 0.5;
        crossings.clear();

        let mut j = polygon.len() - 1;
        for i in 0..polygon.len() {
            let (a, b) = (polygon[j], polygon[i]);
            // half-open so shared vertices are counted once
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
        crossings.sort_by(|l, r| l.total_cmp(r));

        for span in crossings.chunks_exact(2) {
            let x0 = first_covered(span[0]).max(0);
            let x1 = last_covered(span[1]).min(width as i64 - 1);
            for x in x0..=x1 {
                mask.put_pixel(x as u32, row as u32, ON);
            }
        }
    }
    mask
}

/// Union of axis-aligned boxes `[min_x, min_y, max_x, max_y]` into one mask.
/// Overlapping boxes are not double counted.
pub fn rasterize_boxes(boxes: &[[f32; 4]], width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }
    for &[x_min, y_min, x_max, y_max] in boxes {
        let x0 = first_covered(x_min).max(0);
        let x1 = last_covered(x_max).min(width as i64 - 1);
        let y0 = first_covered(y_min).max(0);
        let y1 = last_covered(y_max).min(height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.put_pixel(x as u32, y as u32, ON);
            }
        }
    }
    mask
}

pub fn count_nonzero(mask: &Mask) -> u64 {
    mask.as_raw().iter().filter(|&&v| v != 0).count() as u64
}

/// Pixels set in both masks. Masks of different sizes compare over their overlap.
pub fn intersection_count(a: &Mask, b: &Mask) -> u64 {
    if a.dimensions() == b.dimensions() {
        return a
            .as_raw()
            .iter()
            .zip(b.as_raw())
            .filter(|(&l, &r)| l != 0 && r != 0)
            .count() as u64;
    }
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    let mut n = 0;
    for y in 0..h {
        for x in 0..w {
            if a.get_pixel(x, y).0[0] != 0 && b.get_pixel(x, y).0[0] != 0 {
                n += 1;
            }
        }
    }
    n
}

// first pixel index whose centre is >= v
fn first_covered(v: f32) -> i64 {
    (v - 0.5).ceil() as i64
}

// last pixel index whose centre is <= v
fn last_covered(v: f32) -> i64 {
    (v - 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(s: f32) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(s, 0.0),
            Point2::new(s, s),
            Point2::new(0.0, s),
        ]
    }

    #[test]
    fn test_contains_inside_outside_boundary() {
        let sq = square(100.0);
        assert!(contains_point(&sq, Point2::new(50.0, 50.0)));
        assert!(!contains_point(&sq, Point2::new(150.0, 50.0)));
        assert!(contains_point(&sq, Point2::new(100.0, 50.0)));
        assert!(contains_point(&sq, Point2::new(0.0, 0.0)));
        assert!(contains_point(&sq, Point2::new(50.0, 0.0)));
    }

    #[test]
    fn test_contains_concave() {
        // U shape, notch between x=30..70 above y=40
        let u = vec![
            Point2::new(0.0, 0.0),
            Point2::new(30.0, 0.0),
            Point2::new(30.0, 60.0),
            Point2::new(70.0, 60.0),
            Point2::new(70.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ];
        assert!(!contains_point(&u, Point2::new(50.0, 30.0)));
        assert!(contains_point(&u, Point2::new(50.0, 80.0)));
        assert!(contains_point(&u, Point2::new(15.0, 30.0)));
    }

    #[test]
    fn test_area() {
        assert_eq!(polygon_area(&square(100.0)), 10_000.0);
        let mut rev = square(100.0);
        rev.reverse();
        assert_eq!(polygon_area(&rev), 10_000.0);
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(20.0, 20.0),
        ];
        assert_eq!(polygon_area(&line), 0.0);
    }

    #[test]
    fn test_rasterize_square_pixel_count() {
        let mask = rasterize_polygon(&square(100.0), 200, 200);
        assert_eq!(count_nonzero(&mask), 10_000);
        assert_eq!(mask.get_pixel(0, 0).0[0], 255);
        assert_eq!(mask.get_pixel(99, 99).0[0], 255);
        assert_eq!(mask.get_pixel(100, 50).0[0], 0);
    }

    #[test]
    fn test_rasterize_clips_to_frame() {
        let mask = rasterize_polygon(&square(100.0), 50, 40);
        assert_eq!(count_nonzero(&mask), 50 * 40);
    }

    #[test]
    fn test_triangle_area_close_to_pixels() {
        let tri = vec![
            Point2::new(0.0, 0.0),
            Point2::new(200.0, 0.0),
            Point2::new(0.0, 200.0),
        ];
        let mask = rasterize_polygon(&tri, 300, 300);
        let pixels = count_nonzero(&mask) as f64;
        assert!((pixels - polygon_area(&tri)).abs() / polygon_area(&tri) < 0.02);
    }

    #[test]
    fn test_boxes_union_not_sum() {
        let one = rasterize_boxes(&[[25.0, 25.0, 75.0, 75.0]], 100, 100);
        assert_eq!(count_nonzero(&one), 2_500);
        let twice = rasterize_boxes(&[[25.0, 25.0, 75.0, 75.0], [25.0, 25.0, 75.0, 75.0]], 100, 100);
        assert_eq!(count_nonzero(&twice), 2_500);
        let overlap = rasterize_boxes(&[[0.0, 0.0, 10.0, 10.0], [5.0, 5.0, 15.0, 15.0]], 100, 100);
        assert_eq!(count_nonzero(&overlap), 100 + 100 - 25);
    }

    #[test]
    fn test_intersection_count() {
        let zone = rasterize_polygon(&square(100.0), 200, 200);
        let boxes = rasterize_boxes(&[[50.0, 50.0, 150.0, 150.0]], 200, 200);
        assert_eq!(intersection_count(&zone, &boxes), 2_500);
    }
}
