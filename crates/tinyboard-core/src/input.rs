//! Input events and pointer tracking.

use crate::config::EngineConfig;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Down,
    Move,
    Up,
    DoubleClick,
    /// Key press, named like DOM key values (`"Escape"`, `"Delete"`).
    Key(String),
}

/// A pointer or keyboard event in device coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Milliseconds, monotonic.
    #[serde(default)]
    pub timestamp: f64,
}

impl PointerEvent {
    pub fn new(kind: EventKind, x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::default(),
            timestamp,
        }
    }

    /// Key event; key events carry no position.
    pub fn key(key: &str, timestamp: f64) -> Self {
        Self::new(EventKind::Key(key.to_string()), 0.0, 0.0, timestamp)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn device_position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Remembers where the pointer was pressed and how fast it is moving.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    press: Option<Point>,
    last: Option<(Point, f64)>,
    speed: f64,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press at `point` (world coordinates).
    pub fn press(&mut self, point: Point, timestamp: f64) {
        self.press = Some(point);
        self.last = Some((point, timestamp));
        self.speed = 0.0;
    }

    /// Record a move and return the pointer speed in world units per millisecond.
    pub fn track(&mut self, point: Point, timestamp: f64) -> f64 {
        if let Some((last, last_time)) = self.last {
            let elapsed = timestamp - last_time;
            if elapsed > 0.0 {
                self.speed = (point - last).hypot() / elapsed;
            }
        }
        self.last = Some((point, timestamp));
        self.speed
    }

    pub fn release(&mut self) {
        self.press = None;
        self.speed = 0.0;
    }

    pub fn press_point(&self) -> Option<Point> {
        self.press
    }
}

/// Freehand stroke width for the current pointer speed.
///
/// Width shrinks as the pointer speeds up and is smoothed against the
/// previous sample so that strokes taper gradually.
pub fn stroke_width_for_speed(speed: f64, last_width: Option<f64>, config: &EngineConfig) -> f64 {
    let scale = config.freedraw_speed_scale.max(f64::EPSILON);
    let target = config.freedraw_base_width * scale / (scale + speed.max(0.0));
    let smoothing = config.freedraw_smoothing.clamp(0.0, 1.0);
    match last_width {
        Some(last) => last * smoothing + target * (1.0 - smoothing),
        None => target,
    }
}
