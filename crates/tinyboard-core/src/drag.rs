//! Move, resize and rotate gestures on the active element.
//!
//! Every update during a gesture is computed from the baseline snapshot taken
//! when the gesture began plus the total offset so far, so repeated pointer
//! moves never compound rounding error.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::geometry;
use crate::handles::Handle;
use crate::shapes::{Element, ElementId, ElementKind, PathPoint, TextMeasure, fit_font_size};
use crate::snap::{ANGLE_SNAP_INCREMENT, normalize_angle, snap_angle};
use crate::store::ElementStore;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// What a gesture does to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureMode {
    Move,
    Resize(Handle),
    Rotate,
    /// A freshly created element receiving its initial geometry.
    Create,
}

impl GestureMode {
    /// Mode started by grabbing `handle`.
    pub fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::Rotate => GestureMode::Rotate,
            Handle::Body => GestureMode::Move,
            resize => GestureMode::Resize(resize),
        }
    }
}

/// Geometry captured when a gesture begins.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// Points of a point-shape.
    pub points: Option<Vec<PathPoint>>,
    /// Font size of a text element.
    pub font_size: Option<f64>,
}

impl Baseline {
    fn capture(element: &Element) -> Self {
        Self {
            position: element.position,
            width: element.width,
            height: element.height,
            rotation: element.rotation,
            points: element.points().map(<[PathPoint]>::to_vec),
            font_size: element.text().map(|t| t.font_size),
        }
    }

    fn restore(&self, element: &mut Element) {
        element.position = self.position;
        element.width = self.width;
        element.height = self.height;
        element.rotation = self.rotation;
        if let (Some(points), Some(target)) = (&self.points, element.points_mut()) {
            target.clone_from(points);
        }
        if let (Some(size), Some(text)) = (self.font_size, element.text_mut()) {
            text.font_size = size;
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }
}

/// Gesture state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Active {
        id: ElementId,
        mode: GestureMode,
        baseline: Baseline,
    },
}

/// Drives gestures against the active element of an [`ElementStore`].
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Active { .. })
    }

    pub fn mode(&self) -> Option<GestureMode> {
        match &self.state {
            DragState::Active { mode, .. } => Some(*mode),
            DragState::Idle => None,
        }
    }

    /// Start a gesture on the active element, capturing its baseline.
    ///
    /// A call while a gesture is already open is ignored.
    pub fn begin_gesture(&mut self, store: &ElementStore, mode: GestureMode) -> EngineResult<()> {
        if self.is_active() {
            log::debug!("begin_gesture({mode:?}) ignored: a gesture is already open");
            return Ok(());
        }
        let element = store.get_active().ok_or(EngineError::NoActiveElement)?;
        self.state = DragState::Active {
            id: element.id(),
            mode,
            baseline: Baseline::capture(element),
        };
        log::debug!("gesture {mode:?} began on {}", element.id());
        Ok(())
    }

    /// Start a gesture from a handle identifier such as `"bottomRight"`.
    ///
    /// Unrecognised identifiers fall back to moving the whole element.
    pub fn begin_handle_gesture(&mut self, store: &ElementStore, handle: &str) -> EngineResult<GestureMode> {
        let handle = handle.parse::<Handle>().unwrap_or_else(|err| {
            log::debug!("{err}; moving instead");
            Handle::Body
        });
        let mode = GestureMode::for_handle(handle);
        self.begin_gesture(store, mode)?;
        Ok(mode)
    }

    fn target<'a>(&'a self, store: &'a mut ElementStore) -> EngineResult<(&'a mut Element, &'a Baseline, GestureMode)> {
        let DragState::Active { id, mode, baseline } = &self.state else {
            return Err(EngineError::NoActiveElement);
        };
        let element = store.get_mut(*id).ok_or(EngineError::ElementNotFound(*id))?;
        Ok((element, baseline, *mode))
    }

    /// Translate the element by `(dx, dy)` from its baseline.
    pub fn move_by(&self, store: &mut ElementStore, dx: f64, dy: f64) -> EngineResult<()> {
        let (element, baseline, _) = self.target(store)?;
        let delta = Vec2::new(dx, dy);
        match &baseline.points {
            Some(points) => set_points(element, points.iter().map(|p| p.translated(delta)).collect()),
            None => element.position = baseline.position + delta,
        }
        log::trace!("move {} by ({dx}, {dy})", element.id());
        Ok(())
    }

    /// Give the element the box `(anchor, target_width, target_height)`.
    ///
    /// Point-shapes scale their baseline points and are then translated so
    /// that their bounding rect starts exactly at `anchor`. Text elements
    /// also pick the largest font size fitting the new box.
    pub fn resize(
        &self,
        store: &mut ElementStore,
        target_width: f64,
        target_height: f64,
        anchor: Point,
        measure: &dyn TextMeasure,
        config: &EngineConfig,
    ) -> EngineResult<()> {
        let (element, baseline, _) = self.target(store)?;
        if let Some(points) = &baseline.points {
            let sx = scale_factor(target_width, baseline.width);
            let sy = scale_factor(target_height, baseline.height);
            let scaled: Vec<PathPoint> = points.iter().map(|p| p.scaled(sx, sy)).collect();
            let rect = geometry::try_bounding_rect(scaled.iter().map(PathPoint::point))?;
            let offset = rect.origin() - anchor;
            set_points(element, scaled.iter().map(|p| p.translated(-offset)).collect());
        } else {
            if let Some(text) = element.text_mut() {
                let size = fit_font_size(
                    text,
                    target_width,
                    target_height,
                    measure,
                    config.min_font_size,
                    config.max_font_size,
                );
                text.font_size = size.max(1.0);
            }
            element.set_rect(anchor, target_width, target_height);
        }
        log::trace!("resize {} to {target_width}x{target_height} at {anchor:?}", element.id());
        Ok(())
    }

    /// Resize from the grabbed handle by a world-space pointer offset.
    ///
    /// The offset is turned into the element frame; the corner or edge
    /// opposite the handle stays where it was in world space, also for
    /// rotated elements. With `keep_aspect` the baseline aspect ratio (the
    /// natural one for images) is preserved.
    pub fn resize_by_handle(
        &self,
        store: &mut ElementStore,
        dx: f64,
        dy: f64,
        keep_aspect: bool,
        measure: &dyn TextMeasure,
        config: &EngineConfig,
    ) -> EngineResult<()> {
        let DragState::Active { mode, baseline, id } = &self.state else {
            return Err(EngineError::NoActiveElement);
        };
        let handle = match mode {
            GestureMode::Resize(handle) => *handle,
            GestureMode::Move => return self.move_by(store, dx, dy),
            other => {
                log::debug!("resize_by_handle ignored in {other:?} gesture");
                return Ok(());
            }
        };
        let element = store.get(*id).ok_or(EngineError::ElementNotFound(*id))?;
        let image_ratio = element.image().map(|i| i.natural_aspect_ratio);
        let point_shape = element.is_point_shape();

        let local = geometry::rotate_point(Point::new(dx, dy), Point::ZERO, -baseline.rotation).to_vec2();
        let (sx, sy) = handle.edge_signs();
        let mut width = baseline.width + f64::from(sx) * local.x;
        let mut height = baseline.height + f64::from(sy) * local.y;

        if keep_aspect {
            let ratio = image_ratio.unwrap_or(baseline.width / baseline.height);
            if ratio.is_finite() && ratio > 0.0 {
                if handle.is_corner() {
                    if width.abs() / ratio >= height.abs() {
                        height = (width.abs() / ratio).copysign(height);
                    } else {
                        width = (height.abs() * ratio).copysign(width);
                    }
                } else if sx != 0 {
                    height = (width.abs() / ratio).copysign(baseline.height);
                } else {
                    width = (height.abs() * ratio).copysign(baseline.width);
                }
            }
        }

        if point_shape {
            // A flat axis scales by 1, so its extent stays zero.
            if baseline.width.abs() < f64::EPSILON {
                width = baseline.width;
            }
            if baseline.height.abs() < f64::EPSILON {
                height = baseline.height;
            }
        }

        // Centre of the new box in the baseline frame, keeping the opposite side fixed.
        let along = |sign: i8, start: f64, extent: f64, size: f64| match sign {
            1 => start + size / 2.0,
            -1 => start + extent - size / 2.0,
            _ => start + extent / 2.0,
        };
        let local_center = Point::new(
            along(sx, baseline.position.x, baseline.width, width),
            along(sy, baseline.position.y, baseline.height, height),
        );
        let center = geometry::rotate_point(local_center, baseline.center(), baseline.rotation);
        let (box_w, box_h) = if point_shape {
            (width.abs(), height.abs())
        } else {
            (width, height)
        };
        let anchor = Point::new(center.x - box_w / 2.0, center.y - box_h / 2.0);
        self.resize(store, width, height, anchor, measure, config)
    }

    /// Set the rotation to the baseline rotation plus `angle_offset` degrees.
    pub fn rotate(&self, store: &mut ElementStore, angle_offset: f64) -> EngineResult<()> {
        let (element, baseline, _) = self.target(store)?;
        element.rotation = baseline.rotation + angle_offset;
        log::trace!("rotate {} to {}", element.id(), element.rotation);
        Ok(())
    }

    /// Rotate by the angle swept from `start` to `current` around the
    /// element centre, optionally snapped to 15 degree steps.
    pub fn rotate_by_pointer(&self, store: &mut ElementStore, start: Point, current: Point, snap: bool) -> EngineResult<()> {
        let (element, baseline, _) = self.target(store)?;
        let offset = geometry::angle_between(baseline.center(), start, current);
        let mut rotation = baseline.rotation + offset;
        if snap {
            rotation = snap_angle(rotation, ANGLE_SNAP_INCREMENT);
        }
        element.rotation = normalize_angle(rotation);
        Ok(())
    }

    /// Append a freehand sample to the freedraw element being drawn.
    pub fn add_point(&self, store: &mut ElementStore, point: PathPoint) -> EngineResult<()> {
        let (element, _, _) = self.target(store)?;
        if element.kind() != ElementKind::Freedraw {
            log::debug!("add_point ignored for {}", element.kind());
            return Ok(());
        }
        if let Some(stroke) = element.stroke_mut() {
            stroke.points.push(point);
            stroke.last_width = point.width.or(stroke.last_width);
        }
        element.refresh_bounds();
        Ok(())
    }

    /// Commit the gesture.
    ///
    /// Point-shapes get a final bounding-rect recomputation, box-shapes with
    /// negative sizes are flipped into positive ones, and a creation gesture
    /// finishes the element.
    pub fn end_gesture(&mut self, store: &mut ElementStore) -> EngineResult<()> {
        let DragState::Active { id, mode, .. } = std::mem::take(&mut self.state) else {
            log::debug!("end_gesture ignored: no open gesture");
            return Ok(());
        };
        let element = store.get_mut(id).ok_or(EngineError::ElementNotFound(id))?;
        if element.is_point_shape() {
            element.refresh_bounds();
        } else {
            element.normalize_size();
        }
        if mode == GestureMode::Create {
            element.is_being_created = false;
        }
        log::debug!("gesture {mode:?} ended on {id}");
        Ok(())
    }

    /// Abandon the gesture, restoring the baseline geometry exactly.
    ///
    /// Cancelling a creation gesture removes the new element.
    pub fn cancel_gesture(&mut self, store: &mut ElementStore) -> EngineResult<()> {
        let DragState::Active { id, mode, baseline } = std::mem::take(&mut self.state) else {
            log::debug!("cancel_gesture ignored: no open gesture");
            return Ok(());
        };
        if mode == GestureMode::Create {
            store.delete(id);
        } else {
            let element = store.get_mut(id).ok_or(EngineError::ElementNotFound(id))?;
            baseline.restore(element);
        }
        log::debug!("gesture {mode:?} cancelled on {id}");
        Ok(())
    }
}

fn set_points(element: &mut Element, points: Vec<PathPoint>) {
    if let Some(target) = element.points_mut() {
        *target = points;
    }
    element.refresh_bounds();
}

/// Per-axis scale; an axis with no extent keeps scale 1.
fn scale_factor(target: f64, baseline: f64) -> f64 {
    if baseline.abs() < f64::EPSILON {
        1.0
    } else {
        target / baseline
    }
}
