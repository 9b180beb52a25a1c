//! Board: routes device events through the viewport into the element store
//! and the gesture controller.

use crate::config::EngineConfig;
use crate::drag::{DragController, GestureMode};
use crate::error::{EngineError, EngineResult};
use crate::handles::{self, Handle};
use crate::hit_test::{HitResult, HitTester};
use crate::input::{EventKind, PointerEvent, PointerTracker, stroke_width_for_speed};
use crate::shapes::{
    ApproximateTextMeasure, ElementAttrs, ElementId, ElementKind, ElementRecord, ElementStyle, ImageDecoder,
    PathPoint, StylePatch, TextMeasure,
};
use crate::store::ElementStore;
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Serializable board contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

/// Interactive drawing surface state.
pub struct Board {
    store: ElementStore,
    viewport: Viewport,
    config: EngineConfig,
    drag: DragController,
    tool: ToolKind,
    tracker: PointerTracker,
    /// Style given to newly created elements.
    style: ElementStyle,
    measure: Box<dyn TextMeasure>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Viewport::default())
    }
}

impl Board {
    pub fn new(config: EngineConfig, viewport: Viewport) -> Self {
        Self {
            store: ElementStore::new(),
            viewport: viewport.clamped(),
            config,
            drag: DragController::new(),
            tool: ToolKind::default(),
            tracker: PointerTracker::new(),
            style: ElementStyle::default(),
            measure: Box::new(ApproximateTextMeasure::default()),
        }
    }

    /// Use `measure` for text sizing instead of the approximate metrics.
    pub fn with_text_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ElementStore {
        &mut self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools, finishing any element still being created.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.store.get_active().is_some_and(|e| e.is_being_created) {
            self.finish_creation();
        }
        if tool != ToolKind::Select {
            self.store.set_active(None);
        }
        self.tool = tool;
        log::debug!("tool set to {tool:?}");
    }

    pub fn hit_tester(&self) -> HitTester {
        HitTester::new(self.config.hit_tolerance)
    }

    /// World position of a device point, grid-snapped when enabled.
    pub fn to_world(&self, device: Point) -> Point {
        let grid = self.config.snap_to_grid.then_some(self.config.grid_size);
        self.viewport.to_world_snapped(device, grid)
    }

    /// World positions of the active element's handles, for drawing overlays.
    pub fn active_handles(&self) -> Vec<(Handle, Point)> {
        self.store
            .get_active()
            .filter(|e| !e.is_being_created)
            .map(|e| handles::handle_positions(e, &self.config))
            .unwrap_or_default()
    }

    /// Topmost element under a world point.
    pub fn hit_test(&self, world: Point) -> Option<HitResult> {
        self.store.hit_test(world, &self.hit_tester())
    }

    /// Process one event to completion.
    pub fn handle_event(&mut self, event: &PointerEvent) {
        match &event.kind {
            EventKind::Down => self.pointer_down(event),
            EventKind::Move => self.pointer_move(event),
            EventKind::Up => self.pointer_up(event),
            EventKind::DoubleClick => {
                if self.creating_vertices() {
                    self.finish_creation();
                }
            }
            EventKind::Key(key) => self.key_down(key),
        }
    }

    fn creating_vertices(&self) -> bool {
        self.store
            .get_active()
            .is_some_and(|e| e.is_being_created && e.polyline().is_some())
    }

    fn pointer_down(&mut self, event: &PointerEvent) {
        let world = self.to_world(event.device_position());
        self.tracker.press(world, event.timestamp);
        if self.creating_vertices() {
            absorb(self.store.append_vertex(world), "append_vertex");
            return;
        }
        if self.drag.is_active() {
            return;
        }
        if self
            .store
            .get_active()
            .is_some_and(|e| e.is_being_created && e.kind() == ElementKind::Text)
        {
            self.finish_creation();
        }
        match self.tool {
            ToolKind::Select => self.select_down(world),
            ToolKind::Freedraw => self.start_freedraw(world),
            ToolKind::Text => self.start_text(world),
            tool if tool.places_vertices() => self.start_line(tool, world),
            tool if tool.drags_box() => self.start_box(tool, world),
            _ => {}
        }
    }

    fn select_down(&mut self, world: Point) {
        if let Some(active) = self.store.get_active() {
            if let Some(handle) = handles::hit_test_handles(active, world, &self.config) {
                let mode = GestureMode::for_handle(handle);
                absorb(self.drag.begin_gesture(&self.store, mode), "begin_gesture");
                return;
            }
        }
        match self.hit_test(world) {
            Some(hit) => {
                self.store.set_active(Some(hit.id));
                absorb(self.drag.begin_gesture(&self.store, GestureMode::Move), "begin_gesture");
            }
            None => self.store.set_active(None),
        }
    }

    fn new_attrs(&self, world: Point) -> ElementAttrs {
        ElementAttrs {
            style: Some(self.style.clone()),
            ..ElementAttrs::at(world)
        }
    }

    fn start_box(&mut self, tool: ToolKind, world: Point) {
        let Some(kind) = tool.element_kind() else {
            return;
        };
        let attrs = self.new_attrs(world);
        if self.store.create(kind.name(), &attrs).is_some() {
            absorb(self.drag.begin_gesture(&self.store, GestureMode::Create), "begin_gesture");
        }
    }

    fn start_freedraw(&mut self, world: Point) {
        let width = stroke_width_for_speed(0.0, None, &self.config);
        let attrs = ElementAttrs {
            points: Some(vec![PathPoint::with_width(world.x, world.y, width)]),
            ..self.new_attrs(world)
        };
        if self.store.create(ElementKind::Freedraw.name(), &attrs).is_some() {
            absorb(self.drag.begin_gesture(&self.store, GestureMode::Create), "begin_gesture");
        }
    }

    fn start_line(&mut self, tool: ToolKind, world: Point) {
        let Some(kind) = tool.element_kind() else {
            return;
        };
        let attrs = ElementAttrs {
            points: Some(vec![PathPoint::from(world)]),
            single_segment: Some(tool.single_segment()),
            ..self.new_attrs(world)
        };
        if self.store.create(kind.name(), &attrs).is_some() {
            absorb(self.store.update_provisional_point(world), "update_provisional_point");
        }
    }

    fn start_text(&mut self, world: Point) {
        let attrs = ElementAttrs {
            font_size: Some(self.config.default_font_size),
            line_height_ratio: Some(self.config.default_line_height_ratio),
            font_family: Some(self.config.default_font_family.clone()),
            ..self.new_attrs(world)
        };
        if let Some(id) = self.store.create(ElementKind::Text.name(), &attrs) {
            absorb(self.store.set_text(id, "", self.measure.as_ref()), "set_text");
        }
    }

    fn pointer_move(&mut self, event: &PointerEvent) {
        let world = self.to_world(event.device_position());
        let speed = self.tracker.track(world, event.timestamp);
        if self.creating_vertices() {
            absorb(self.store.update_provisional_point(world), "update_provisional_point");
            return;
        }
        let (Some(mode), Some(press)) = (self.drag.mode(), self.tracker.press_point()) else {
            return;
        };
        let offset = world - press;
        let shift = event.modifiers.shift;
        let result = match mode {
            GestureMode::Move => self.drag.move_by(&mut self.store, offset.x, offset.y),
            GestureMode::Resize(_) => self.drag.resize_by_handle(
                &mut self.store,
                offset.x,
                offset.y,
                shift,
                self.measure.as_ref(),
                &self.config,
            ),
            GestureMode::Rotate => self.drag.rotate_by_pointer(&mut self.store, press, world, shift),
            GestureMode::Create => self.update_creation(press, world, speed, shift),
        };
        absorb(result, "pointer move");
    }

    fn update_creation(&mut self, press: Point, world: Point, speed: f64, square: bool) -> EngineResult<()> {
        let active = self.store.get_active().ok_or(EngineError::NoActiveElement)?;
        if active.kind() == ElementKind::Freedraw {
            let last = active.stroke().and_then(|s| s.last_width);
            let width = stroke_width_for_speed(speed, last, &self.config);
            return self
                .drag
                .add_point(&mut self.store, PathPoint::with_width(world.x, world.y, width));
        }
        let mut size = world - press;
        if square {
            let side = size.x.abs().max(size.y.abs());
            size = Vec2::new(side.copysign(size.x), side.copysign(size.y));
        }
        self.drag
            .resize(&mut self.store, size.x, size.y, press, self.measure.as_ref(), &self.config)
    }

    fn pointer_up(&mut self, event: &PointerEvent) {
        let world = self.to_world(event.device_position());
        if self.creating_vertices() {
            // A dragged-out single segment ends where the pointer is released.
            let dragged = self.store.get_active().and_then(|e| e.polyline()).is_some_and(|line| {
                line.single_segment
                    && line.points.len() == 1
                    && (world - line.points[0].point()).hypot() > self.config.hit_tolerance
            });
            if dragged {
                absorb(self.store.append_vertex(world), "append_vertex");
            }
        } else if let Some(mode) = self.drag.mode() {
            let id = self.store.active_id();
            absorb(self.drag.end_gesture(&mut self.store), "end_gesture");
            if mode == GestureMode::Create {
                self.drop_empty_box(id);
            }
        }
        self.tracker.release();
    }

    /// A click without drag leaves a zero-sized box behind; remove it.
    fn drop_empty_box(&mut self, id: Option<ElementId>) {
        let Some(id) = id else {
            return;
        };
        let empty = self
            .store
            .get(id)
            .is_some_and(|e| !e.is_point_shape() && e.width == 0.0 && e.height == 0.0);
        if empty {
            self.store.delete(id);
        }
    }

    fn key_down(&mut self, key: &str) {
        match key {
            "Escape" => {
                if self.drag.is_active() {
                    absorb(self.drag.cancel_gesture(&mut self.store), "cancel_gesture");
                } else if self.store.get_active().is_some_and(|e| e.is_being_created) {
                    self.finish_creation();
                } else {
                    self.store.set_active(None);
                }
            }
            "Delete" | "Backspace" => {
                let deletable = !self.drag.is_active() && self.store.get_active().is_some_and(|e| !e.is_being_created);
                if let (true, Some(id)) = (deletable, self.store.active_id()) {
                    self.store.delete(id);
                }
            }
            _ => {}
        }
    }

    /// Finish the element being created; returns its id when it survives.
    pub fn finish_creation(&mut self) -> Option<ElementId> {
        if let Some(line) = self.store.get_active_mut().and_then(|e| e.polyline_mut()) {
            // A double-click also delivers a click on the last vertex.
            while line.points.len() > 2 {
                let n = line.points.len();
                if (line.points[n - 1].point() - line.points[n - 2].point()).hypot() > f64::EPSILON {
                    break;
                }
                line.points.pop();
            }
        }
        absorb(self.store.complete_create(), "complete_create").flatten()
    }

    /// Replace the content of the active text element.
    pub fn set_text(&mut self, text: &str) -> EngineResult<()> {
        let id = self.store.active_id().ok_or(EngineError::NoActiveElement)?;
        self.store.set_text(id, text, self.measure.as_ref())
    }

    /// Place an image centred on a device point.
    pub fn insert_image(&mut self, source_ref: &str, device: Point, decoder: &dyn ImageDecoder) -> EngineResult<ElementId> {
        let center = self.to_world(device);
        let id = self
            .store
            .create_image(source_ref, center, decoder, self.config.image_max_width)?;
        if let Some(element) = self.store.get_mut(id) {
            element.style = self.style.clone();
        }
        Ok(id)
    }

    /// Update the style for new elements and the active element.
    pub fn set_style(&mut self, patch: &StylePatch) {
        self.style.apply(patch);
        absorb(self.store.set_active_style(patch), "set_active_style");
    }

    /// Paste a copy of `id`, at a device point or offset from the original.
    pub fn paste(&mut self, id: ElementId, at: Option<Point>) -> EngineResult<ElementId> {
        let at = at.map(|device| self.to_world(device));
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        self.store.duplicate(id, at, offset, true)
    }

    pub fn delete_all(&mut self) {
        self.drag = DragController::new();
        self.tracker.release();
        self.store.delete_all();
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.viewport.scroll_by(Vec2::new(dx, dy));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            viewport: self.viewport.clone(),
            elements: self.store.serialize_all(),
        }
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replace the viewport and all elements from a snapshot.
    pub fn load(&mut self, snapshot: &BoardSnapshot) {
        self.delete_all();
        self.viewport = snapshot.viewport.clone().clamped();
        self.store.load(&snapshot.elements);
    }

    pub fn load_json(&mut self, json: &str) -> EngineResult<()> {
        let snapshot: BoardSnapshot = serde_json::from_str(json)?;
        self.load(&snapshot);
        Ok(())
    }
}

/// User-originated errors never escape the event loop; log and carry on.
fn absorb<T>(result: EngineResult<T>, action: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{action} ignored: {err}");
            None
        }
    }
}
