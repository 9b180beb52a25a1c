//! Per-kind hit testing in the element's unrotated local frame.

use crate::geometry::{self, point_in_polygon, point_to_segment_dist};
use crate::shapes::{Element, ElementData, ElementId, ElementKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Which part of an element a query point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitPart {
    /// Outline of a polygon (edge index), ellipse (always 0) or polyline (segment index).
    Edge(usize),
    /// Filled interior of a box-shape.
    Inner,
    /// Anywhere inside the box of a text or image element.
    Body,
}

/// A hit against a specific element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub id: ElementId,
    pub part: HitPart,
}

/// Tests world points against elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTester {
    /// Stroke tolerance in world units.
    pub tolerance: f64,
}

impl Default for HitTester {
    fn default() -> Self {
        Self { tolerance: 10.0 }
    }
}

impl HitTester {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Test `point` (world coordinates) against `element`.
    pub fn hit_test(&self, element: &Element, point: Point) -> Option<HitPart> {
        let local = geometry::reverse_rotate(point, element.center(), element.rotation);
        let rect = element.rect();
        match element.kind() {
            ElementKind::Rectangle | ElementKind::Diamond | ElementKind::Triangle => {
                self.hit_polygon(&outline(element.kind(), rect), local, element.style.has_fill())
            }
            ElementKind::Circle => self.hit_ellipse(rect, local, element.style.has_fill()),
            ElementKind::Line | ElementKind::Arrow => self.hit_polyline(element, local),
            ElementKind::Freedraw => self.hit_stroke(element, local),
            ElementKind::Text | ElementKind::Image => contains_inclusive(rect, local).then_some(HitPart::Body),
        }
    }

    fn hit_polygon(&self, polygon: &[Point], local: Point, filled: bool) -> Option<HitPart> {
        if let Some(edge) = geometry::nearest_polygon_edge(local, polygon, self.tolerance) {
            return Some(HitPart::Edge(edge));
        }
        (filled && point_in_polygon(local, polygon)).then_some(HitPart::Inner)
    }

    fn hit_ellipse(&self, rect: Rect, local: Point, filled: bool) -> Option<HitPart> {
        let center = rect.center();
        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;
        if rx < f64::EPSILON || ry < f64::EPSILON {
            // Collapsed to a segment (or a point).
            let a = Point::new(rect.x0, rect.y0);
            let b = Point::new(rect.x1, rect.y1);
            return (point_to_segment_dist(local, a, b) <= self.tolerance).then_some(HitPart::Edge(0));
        }
        let offset = local - center;
        let d = offset.hypot();
        let n = ((offset.x / rx).powi(2) + (offset.y / ry).powi(2)).sqrt();
        let edge_distance = if n < f64::EPSILON {
            rx.min(ry)
        } else {
            (d * (1.0 - 1.0 / n)).abs()
        };
        if edge_distance <= self.tolerance {
            Some(HitPart::Edge(0))
        } else if filled && n <= 1.0 {
            Some(HitPart::Inner)
        } else {
            None
        }
    }

    fn hit_polyline(&self, element: &Element, local: Point) -> Option<HitPart> {
        let line = element.polyline()?;
        if let [only] = line.points.as_slice() {
            if line.provisional_point.is_none() || !element.is_being_created {
                return ((local - only.point()).hypot() <= self.tolerance).then_some(HitPart::Edge(0));
            }
        }
        line.segments(element.is_being_created)
            .into_iter()
            .enumerate()
            .map(|(i, (a, b))| (i, point_to_segment_dist(local, a, b)))
            .filter(|&(_, d)| d <= self.tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| HitPart::Edge(i))
    }

    fn hit_stroke(&self, element: &Element, local: Point) -> Option<HitPart> {
        let ElementData::Stroke(stroke) = &element.data else {
            return None;
        };
        if let [only] = stroke.points.as_slice() {
            let reach = self.tolerance + only.width.unwrap_or(0.0) / 2.0;
            return ((local - only.point()).hypot() <= reach).then_some(HitPart::Edge(0));
        }
        stroke
            .segments()
            .enumerate()
            .find(|(_, (a, b, width))| point_to_segment_dist(local, *a, *b) <= self.tolerance + width / 2.0)
            .map(|(i, _)| HitPart::Edge(i))
    }
}

/// Outline polygon of a box-shape in its local frame.
pub(crate) fn outline(kind: ElementKind, rect: Rect) -> Vec<Point> {
    let center = rect.center();
    match kind {
        ElementKind::Diamond => vec![
            Point::new(center.x, rect.y0),
            Point::new(rect.x1, center.y),
            Point::new(center.x, rect.y1),
            Point::new(rect.x0, center.y),
        ],
        ElementKind::Triangle => vec![
            Point::new(center.x, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ],
        _ => vec![
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ],
    }
}

fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{PathPoint, SerializableColor};

    fn tester() -> HitTester {
        HitTester::new(10.0)
    }

    fn boxed(kind: ElementKind, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(kind, Point::new(x, y)).with_size(w, h)
    }

    #[test]
    fn test_rectangle_outline_only() {
        let rect = boxed(ElementKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
        assert_eq!(tester().hit_test(&rect, Point::new(50.0, 3.0)), Some(HitPart::Edge(0)));
        assert_eq!(tester().hit_test(&rect, Point::new(105.0, 25.0)), Some(HitPart::Edge(1)));
        assert_eq!(tester().hit_test(&rect, Point::new(50.0, 25.0)), None);
        assert_eq!(tester().hit_test(&rect, Point::new(50.0, 70.0)), None);
    }

    #[test]
    fn test_filled_rectangle_inner() {
        let mut rect = boxed(ElementKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
        rect.style.fill_color = Some(SerializableColor::white());
        assert_eq!(tester().hit_test(&rect, Point::new(50.0, 25.0)), Some(HitPart::Inner));
    }

    #[test]
    fn test_diamond_corner_is_empty() {
        let mut diamond = boxed(ElementKind::Diamond, 0.0, 0.0, 100.0, 100.0);
        diamond.style.fill_color = Some(SerializableColor::black());
        assert_eq!(tester().hit_test(&diamond, Point::new(2.0, 2.0)), None);
        assert_eq!(tester().hit_test(&diamond, Point::new(50.0, 50.0)), Some(HitPart::Inner));
        assert!(matches!(tester().hit_test(&diamond, Point::new(25.0, 25.0)), Some(HitPart::Edge(3))));
    }

    #[test]
    fn test_triangle_base() {
        let triangle = boxed(ElementKind::Triangle, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(tester().hit_test(&triangle, Point::new(50.0, 98.0)), Some(HitPart::Edge(1)));
        assert_eq!(tester().hit_test(&triangle, Point::new(50.0, 60.0)), None);
    }

    #[test]
    fn test_circle_tolerance_band() {
        // Centred at the origin with radius 25.
        let circle = boxed(ElementKind::Circle, -25.0, -25.0, 50.0, 50.0);
        assert_eq!(tester().hit_test(&circle, Point::new(30.0, 0.0)), Some(HitPart::Edge(0)));
        assert_eq!(tester().hit_test(&circle, Point::new(50.0, 0.0)), None);
        assert_eq!(tester().hit_test(&circle, Point::new(0.0, -20.0)), Some(HitPart::Edge(0)));
        assert_eq!(tester().hit_test(&circle, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_ellipse_uses_independent_radii() {
        let ellipse = boxed(ElementKind::Circle, 0.0, 0.0, 200.0, 50.0);
        assert!(tester().hit_test(&ellipse, Point::new(195.0, 25.0)).is_some());
        assert!(tester().hit_test(&ellipse, Point::new(100.0, 2.0)).is_some());
        assert!(tester().hit_test(&ellipse, Point::new(100.0, 25.0)).is_none());
    }

    #[test]
    fn test_rotated_rectangle() {
        let mut rect = boxed(ElementKind::Rectangle, 0.0, 40.0, 100.0, 20.0);
        rect.rotation = 90.0;
        // Now a vertical bar through (50, 50); its local left edge is on top at y = 0.
        assert_eq!(tester().hit_test(&rect, Point::new(50.0, 1.0)), Some(HitPart::Edge(3)));
        assert_eq!(tester().hit_test(&rect, Point::new(5.0, 45.0)), None);
    }

    #[test]
    fn test_rotation_invariance() {
        let tester = tester();
        for kind in [ElementKind::Rectangle, ElementKind::Diamond, ElementKind::Triangle, ElementKind::Circle] {
            let base = boxed(kind, 10.0, 20.0, 120.0, 60.0);
            let center = base.center();
            for &angle in &[17.0, 90.0, 233.5] {
                let mut rotated = base.clone();
                rotated.rotation = angle;
                for &(x, y) in &[(12.0, 23.0), (75.0, 24.0), (70.0, 50.0), (128.0, 79.0), (0.0, 0.0)] {
                    let p = Point::new(x, y);
                    let moved = geometry::rotate_point(p, center, angle);
                    assert_eq!(tester.hit_test(&base, p), tester.hit_test(&rotated, moved));
                }
            }
        }
    }

    #[test]
    fn test_polyline_segments() {
        let line = Element::new(ElementKind::Line, Point::ZERO).with_points(vec![
            PathPoint::new(0.0, 0.0),
            PathPoint::new(100.0, 0.0),
            PathPoint::new(100.0, 100.0),
        ]);
        assert_eq!(tester().hit_test(&line, Point::new(50.0, 5.0)), Some(HitPart::Edge(0)));
        assert_eq!(tester().hit_test(&line, Point::new(95.0, 60.0)), Some(HitPart::Edge(1)));
        assert_eq!(tester().hit_test(&line, Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn test_provisional_segment_only_while_creating() {
        let mut arrow = Element::new(ElementKind::Arrow, Point::ZERO)
            .with_points(vec![PathPoint::new(0.0, 0.0), PathPoint::new(100.0, 0.0)]);
        arrow.polyline_mut().unwrap().provisional_point = Some(Point::new(100.0, 100.0));
        let query = Point::new(100.0, 50.0);
        assert_eq!(tester().hit_test(&arrow, query), None);
        arrow.is_being_created = true;
        assert_eq!(tester().hit_test(&arrow, query), Some(HitPart::Edge(1)));
    }

    #[test]
    fn test_freedraw_width_widens_tolerance() {
        let stroke = Element::new(ElementKind::Freedraw, Point::ZERO).with_points(vec![
            PathPoint::with_width(0.0, 0.0, 16.0),
            PathPoint::with_width(100.0, 0.0, 16.0),
        ]);
        assert_eq!(tester().hit_test(&stroke, Point::new(50.0, 17.0)), Some(HitPart::Edge(0)));
        assert_eq!(tester().hit_test(&stroke, Point::new(50.0, 19.0)), None);
    }

    #[test]
    fn test_text_box_containment() {
        let text = boxed(ElementKind::Text, 10.0, 10.0, 50.0, 20.0);
        assert_eq!(tester().hit_test(&text, Point::new(30.0, 20.0)), Some(HitPart::Body));
        assert_eq!(tester().hit_test(&text, Point::new(61.0, 20.0)), None);
    }
}
