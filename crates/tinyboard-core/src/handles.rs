//! Drag handles of the active element.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry;
use crate::shapes::Element;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A resize control, the rotate control, or the element body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
    /// The element itself; dragging it moves the element.
    Body,
}

impl Handle {
    /// Resize handles in drawing order, corners first.
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomRight,
        Handle::BottomLeft,
        Handle::Top,
        Handle::Right,
        Handle::Bottom,
        Handle::Left,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomRight | Handle::BottomLeft
        )
    }

    /// Which box edges this handle drags: `(x, y)` with -1 for the
    /// left/top edge, 1 for the right/bottom edge and 0 for neither.
    pub fn edge_signs(self) -> (i8, i8) {
        match self {
            Handle::TopLeft => (-1, -1),
            Handle::Top => (0, -1),
            Handle::TopRight => (1, -1),
            Handle::Right => (1, 0),
            Handle::BottomRight => (1, 1),
            Handle::Bottom => (0, 1),
            Handle::BottomLeft => (-1, 1),
            Handle::Left => (-1, 0),
            Handle::Rotate | Handle::Body => (0, 0),
        }
    }

    /// Position of the handle on `rect`, before rotation.
    pub fn local_position(self, rect: Rect, rotate_offset: f64) -> Point {
        let center = rect.center();
        let pick = |sign: i8, lo: f64, mid: f64, hi: f64| match sign {
            -1 => lo,
            1 => hi,
            _ => mid,
        };
        match self {
            Handle::Rotate => Point::new(center.x, rect.y0 - rotate_offset),
            Handle::Body => center,
            _ => {
                let (sx, sy) = self.edge_signs();
                Point::new(pick(sx, rect.x0, center.x, rect.x1), pick(sy, rect.y0, center.y, rect.y1))
            }
        }
    }
}

impl FromStr for Handle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topLeft" => Ok(Handle::TopLeft),
            "top" => Ok(Handle::Top),
            "topRight" => Ok(Handle::TopRight),
            "right" => Ok(Handle::Right),
            "bottomRight" => Ok(Handle::BottomRight),
            "bottom" => Ok(Handle::Bottom),
            "bottomLeft" => Ok(Handle::BottomLeft),
            "left" => Ok(Handle::Left),
            "rotate" => Ok(Handle::Rotate),
            "body" => Ok(Handle::Body),
            other => Err(EngineError::UnknownHandle(other.to_string())),
        }
    }
}

/// World positions of every handle of `element`, rotated with it.
pub fn handle_positions(element: &Element, config: &EngineConfig) -> Vec<(Handle, Point)> {
    let rect = element.rect();
    let center = element.center();
    Handle::RESIZE
        .iter()
        .copied()
        .chain(std::iter::once(Handle::Rotate))
        .map(|handle| {
            let local = handle.local_position(rect, config.rotate_handle_offset);
            (handle, geometry::rotate_point(local, center, element.rotation))
        })
        .collect()
}

/// Handle of `element` under `point` (world coordinates), if any.
///
/// The point is reverse-rotated into the element frame, so handles are
/// axis-aligned squares of side `handle_size` there.
pub fn hit_test_handles(element: &Element, point: Point, config: &EngineConfig) -> Option<Handle> {
    let local = geometry::reverse_rotate(point, element.center(), element.rotation);
    let rect = element.rect();
    let half = config.handle_size / 2.0;
    std::iter::once(Handle::Rotate)
        .chain(Handle::RESIZE.iter().copied())
        .find(|handle| {
            let pos = handle.local_position(rect, config.rotate_handle_offset);
            (local.x - pos.x).abs() <= half && (local.y - pos.y).abs() <= half
        })
}
