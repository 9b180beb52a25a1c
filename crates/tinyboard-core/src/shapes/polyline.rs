//! Point-sequence payloads for lines, arrows and freehand strokes.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A vertex of a point-shape.
///
/// `width` carries the stroke-width sample recorded for freehand strokes and
/// is `None` for line and arrow vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl PathPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, width: None }
    }

    /// A freehand sample with its stroke width.
    pub fn with_width(x: f64, y: f64, width: f64) -> Self {
        Self {
            x,
            y,
            width: Some(width),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same sample moved by `delta`; the width is kept.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            width: self.width,
        }
    }

    /// Same sample with coordinates multiplied per axis.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width,
        }
    }
}

impl From<Point> for PathPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Vertices of a line or arrow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Committed vertices.
    pub points: Vec<PathPoint>,
    /// Trailing preview vertex that follows the pointer during creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional_point: Option<Point>,
    /// Finish creation as soon as the second vertex is placed.
    #[serde(default)]
    pub single_segment: bool,
}

impl Polyline {
    /// Segments between consecutive vertices, optionally followed by the
    /// segment from the last vertex to the provisional point.
    pub fn segments(&self, include_provisional: bool) -> Vec<(Point, Point)> {
        let mut segments: Vec<(Point, Point)> = self
            .points
            .windows(2)
            .map(|w| (w[0].point(), w[1].point()))
            .collect();
        if include_provisional {
            if let (Some(last), Some(provisional)) = (self.points.last(), self.provisional_point) {
                segments.push((last.point(), provisional));
            }
        }
        segments
    }
}

/// Samples of a freehand stroke.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<PathPoint>,
    /// Width of the most recent sample, the seed for smoothing the next one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_width: Option<f64>,
}

impl Stroke {
    /// Segments between consecutive samples paired with the wider of the two
    /// sample widths.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, f64)> + '_ {
        self.points.windows(2).map(|w| {
            let width = w[0].width.unwrap_or(0.0).max(w[1].width.unwrap_or(0.0));
            (w[0].point(), w[1].point(), width)
        })
    }
}
