/// 折线简化 (Stroke simplification)
///
/// Freehand strokes carry one point per pointer sample. Before they are stored
/// as zone polygons they are snapped to integer media pixels and reduced with
/// Douglas-Peucker at a tolerance proportional to the closed perimeter.
use super::Point2;
use crate::error::{Error, Result};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Tolerance ratio used by the desktop editor
pub const DEFAULT_SIMPLIFY_RATIO: f64 = 0.008;

/// Simplify a stroke into a closed polygon.
///
/// `ratio` is the `k` in `epsilon = k * perimeter`. The result has at least
/// 3 and at most `stroke.len()` vertices, without a repeated closing vertex.
pub fn simplify_stroke(stroke: &[Point2], ratio: f64) -> Result<Vec<Point2>> {
    if stroke.len() < 3 {
        return Err(Error::NotEnoughPoints(stroke.len()));
    }

    let pixels: Vec<Point<i32>> = stroke
        .iter()
        .map(|p| {
            let [x, y] = p.to_pixel();
            Point::new(x, y)
        })
        .collect();

    let epsilon = ratio * arc_length(&pixels, true);
    let simplified = if epsilon > 0.0 {
        approximate_closed(&pixels, epsilon)
    } else {
        Vec::new()
    };

    let out = if simplified.len() >= 3 && simplified.len() <= pixels.len() {
        simplified
    } else {
        fallback_triangle(&pixels)
    };

    Ok(out.into_iter().map(|p| Point2::new(p.x as f32, p.y as f32)).collect())
}

/// Closed-contour Douglas-Peucker: split at the vertex farthest from the
/// start, simplify both open halves, then join them back into one ring.
fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let dx = (p.x - start.x) as i64;
            let dy = (p.y - start.y) as i64;
            dx * dx + dy * dy
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    if far == 0 {
        return Vec::new();
    }

    let first_half = &points[..=far];
    let mut second_half: Vec<Point<i32>> = points[far..].to_vec();
    second_half.push(start);

    let mut ring = approximate_polygon_dp(first_half, epsilon, false);
    ring.pop();
    let mut tail = approximate_polygon_dp(&second_half, epsilon, false);
    tail.pop();
    ring.append(&mut tail);
    ring
}

fn fallback_triangle(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    vec![points[0], points[n / 3], points[2 * n / 3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Dense freehand-like trace of a 200x100 rectangle, 1px steps
    fn dense_rectangle() -> Vec<Point2> {
        let mut pts = Vec::new();
        for x in 0..200 {
            pts.push(Point2::new(x as f32, 0.0));
        }
        for y in 0..100 {
            pts.push(Point2::new(200.0, y as f32));
        }
        for x in (1..=200).rev() {
            pts.push(Point2::new(x as f32, 100.0));
        }
        for y in (1..=100).rev() {
            pts.push(Point2::new(0.0, y as f32));
        }
        pts
    }

    #[test]
    fn test_too_few_points() {
        let stroke = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(matches!(
            simplify_stroke(&stroke, DEFAULT_SIMPLIFY_RATIO),
            Err(Error::NotEnoughPoints(2))
        ));
    }

    #[test]
    fn test_rectangle_reduces_to_corners() {
        let stroke = dense_rectangle();
        let poly = simplify_stroke(&stroke, DEFAULT_SIMPLIFY_RATIO).unwrap();
        assert_eq!(poly.len(), 4, "{:?}", poly);
        for corner in [(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)] {
            assert!(poly.contains(&Point2::new(corner.0, corner.1)), "missing {:?}", corner);
        }
    }

    #[test]
    fn test_degenerate_strokes_still_give_three_points() {
        let same = vec![Point2::new(5.0, 5.0); 10];
        assert_eq!(simplify_stroke(&same, 0.005).unwrap().len(), 3);

        let line: Vec<Point2> = (0..50).map(|i| Point2::new(i as f32, i as f32)).collect();
        let poly = simplify_stroke(&line, 0.005).unwrap();
        assert!(poly.len() >= 3 && poly.len() <= line.len());
    }

    #[test]
    fn test_vertex_count_bounds_on_random_strokes() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let n = rng.gen_range(3..400);
            let stroke: Vec<Point2> = (0..n)
                .map(|_| Point2::new(rng.gen_range(0.0..1920.0), rng.gen_range(0.0..1080.0)))
                .collect();
            let poly = simplify_stroke(&stroke, 0.005).unwrap();
            assert!(poly.len() >= 3, "n={} got {}", n, poly.len());
            assert!(poly.len() <= n, "n={} got {}", n, poly.len());
        }
    }
}
