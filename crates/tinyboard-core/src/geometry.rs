//! Geometric primitives shared by hit-testing and gestures.

use crate::error::{EngineError, EngineResult};
use kurbo::{Affine, Point, Rect};

/// Minimal axis-aligned rectangle enclosing `points`.
///
/// Callers must never pass an empty sequence; point-shapes always carry at
/// least one point. An empty input trips a debug assertion and yields the
/// degenerate `(+inf, +inf, -inf, -inf)` rect in release builds.
pub fn bounding_rect<I>(points: I) -> Rect
where
    I: IntoIterator<Item = Point>,
{
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut count = 0usize;

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
        count += 1;
    }

    debug_assert!(count > 0, "bounding rect of an empty point sequence");
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Checked variant of [`bounding_rect`].
pub fn try_bounding_rect<I>(points: I) -> EngineResult<Rect>
where
    I: IntoIterator<Item = Point>,
{
    let mut iter = points.into_iter().peekable();
    if iter.peek().is_none() {
        return Err(EngineError::DegenerateGeometry);
    }
    Ok(bounding_rect(iter))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Rotate `point` about `center` by `angle_deg` degrees.
///
/// Positive angles turn clockwise on screen (y grows downward).
pub fn rotate_point(point: Point, center: Point, angle_deg: f64) -> Point {
    if angle_deg == 0.0 {
        return point;
    }
    Affine::rotate_about(angle_deg.to_radians(), center) * point
}

/// Rotate `point` about `center` by `-angle_deg`, mapping a world-space
/// query into the unrotated local frame of an element.
pub fn reverse_rotate(point: Point, center: Point, angle_deg: f64) -> Point {
    rotate_point(point, center, -angle_deg)
}

/// Signed angle in degrees swept from `from` to `to` around `center`.
pub fn angle_between(center: Point, from: Point, to: Point) -> f64 {
    let a = (to.y - center.y).atan2(to.x - center.x);
    let b = (from.y - center.y).atan2(from.x - center.x);
    (a - b).to_degrees()
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Index of the closest closed-polygon edge within `tolerance` of `point`.
///
/// Edge `i` runs from `polygon[i]` to `polygon[(i + 1) % n]`.
pub fn nearest_polygon_edge(point: Point, polygon: &[Point], tolerance: f64) -> Option<usize> {
    let n = polygon.len();
    (0..n)
        .map(|i| (i, point_to_segment_dist(point, polygon[i], polygon[(i + 1) % n])))
        .filter(|&(_, d)| d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
