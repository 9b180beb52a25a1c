//! Element storage and the active-element slot.

use crate::error::{EngineError, EngineResult};
use crate::hit_test::{HitResult, HitTester};
use crate::shapes::{
    Element, ElementAttrs, ElementId, ElementKind, ElementRecord, ImageDecoder, PathPoint, StylePatch,
    TextMeasure, placement_rect,
};
use kurbo::{Point, Vec2};

/// What currently holds the active slot. An active element and an active
/// multi-selection exclude each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveSlot {
    #[default]
    None,
    Element(ElementId),
    Selection(Vec<ElementId>),
}

/// All elements of a board, in z-order (back to front).
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    active: ActiveSlot,
}

impl ElementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element from a kind name and initial attributes.
    ///
    /// The new element is in the being-created state and becomes active.
    /// Unknown kinds add nothing and return `None`.
    pub fn create(&mut self, kind: &str, attrs: &ElementAttrs) -> Option<ElementId> {
        let kind = match kind.parse::<ElementKind>() {
            Ok(kind) => kind,
            Err(err) => {
                log::debug!("create ignored: {err}");
                return None;
            }
        };
        let mut element = Element::from_attrs(kind, attrs);
        element.is_being_created = true;
        let id = self.add(element);
        self.set_active(Some(id));
        log::debug!("created {kind} {id}");
        Some(id)
    }

    /// Append an element on top of the z-order.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id();
        self.elements.push(element);
        id
    }

    /// Remove an element, clearing the active slot if it referenced it.
    pub fn delete(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        let removed = self.elements.remove(index);
        if self.active_id() == Some(id) {
            self.active = ActiveSlot::None;
        } else if let ActiveSlot::Selection(ids) = &mut self.active {
            ids.retain(|&member| member != id);
        }
        log::debug!("deleted {} {id}", removed.kind());
        Some(removed)
    }

    /// Remove every element and clear the active slot.
    pub fn delete_all(&mut self) {
        self.elements.clear();
        self.active = ActiveSlot::None;
        log::debug!("deleted all elements");
    }

    /// Read-only view of all elements, back to front.
    pub fn list(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    pub fn active_slot(&self) -> &ActiveSlot {
        &self.active
    }

    pub fn active_id(&self) -> Option<ElementId> {
        match self.active {
            ActiveSlot::Element(id) => Some(id),
            _ => None,
        }
    }

    pub fn get_active(&self) -> Option<&Element> {
        self.active_id().and_then(|id| self.get(id))
    }

    pub fn get_active_mut(&mut self) -> Option<&mut Element> {
        let id = self.active_id()?;
        self.get_mut(id)
    }

    /// Make `id` the active element, or clear the slot with `None`.
    ///
    /// Any previously active element or multi-selection is released.
    pub fn set_active(&mut self, id: Option<ElementId>) {
        self.release_active();
        let Some(id) = id else {
            return;
        };
        match self.get_mut(id) {
            Some(element) => {
                element.is_active = true;
                self.active = ActiveSlot::Element(id);
            }
            None => log::debug!("set_active ignored: {}", EngineError::ElementNotFound(id)),
        }
    }

    /// Make a multi-selection active, releasing any active element.
    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        self.release_active();
        let ids: Vec<ElementId> = ids.into_iter().filter(|&id| self.get(id).is_some()).collect();
        if !ids.is_empty() {
            self.active = ActiveSlot::Selection(ids);
        }
    }

    fn release_active(&mut self) {
        if let Some(element) = self.get_active_mut() {
            element.is_active = false;
        }
        self.active = ActiveSlot::None;
    }

    /// Topmost element under `point`, together with the part that was hit.
    pub fn hit_test(&self, point: Point, tester: &HitTester) -> Option<HitResult> {
        self.elements.iter().rev().find_map(|element| {
            tester
                .hit_test(element, point)
                .map(|part| HitResult { id: element.id(), part })
        })
    }

    /// Plain record of one element.
    pub fn serialize(&self, id: ElementId) -> Option<ElementRecord> {
        self.get(id).map(Element::to_record)
    }

    /// Records of every element, back to front.
    pub fn serialize_all(&self) -> Vec<ElementRecord> {
        self.elements.iter().map(Element::to_record).collect()
    }

    /// Replace the contents with elements rebuilt from `records`.
    ///
    /// Loaded elements are inactive and finished.
    pub fn load(&mut self, records: &[ElementRecord]) {
        self.delete_all();
        for record in records {
            let mut element = Element::from_record(record);
            element.is_active = false;
            element.is_being_created = false;
            self.elements.push(element);
        }
        log::debug!("loaded {} elements", self.elements.len());
    }

    /// Serialize every element to a JSON array.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(&self.serialize_all())?)
    }

    /// Replace the contents from a JSON array of records.
    pub fn load_json(&mut self, json: &str) -> EngineResult<()> {
        let records: Vec<ElementRecord> = serde_json::from_str(json)?;
        self.load(&records);
        Ok(())
    }

    /// Copy an element under a fresh id.
    ///
    /// The copy's box is placed with its top-left at `at`, or offset from the
    /// original by `offset` when no position is given. It is finished
    /// immediately and, when `activate` is set, becomes active.
    pub fn duplicate(
        &mut self,
        id: ElementId,
        at: Option<Point>,
        offset: Vec2,
        activate: bool,
    ) -> EngineResult<ElementId> {
        let source = self.get(id).ok_or(EngineError::ElementNotFound(id))?;
        let mut copy = Element::from_record(&source.to_record());
        copy.regenerate_id();
        copy.is_active = false;
        copy.is_being_created = false;
        if let Some(polyline) = copy.polyline_mut() {
            polyline.provisional_point = None;
        }
        let delta = match at {
            Some(target) => target - copy.position,
            None => offset,
        };
        copy.translate(delta);
        let new_id = self.add(copy);
        if activate {
            self.set_active(Some(new_id));
        }
        log::debug!("duplicated {id} as {new_id}");
        Ok(new_id)
    }

    /// Update style fields of the active element.
    pub fn set_active_style(&mut self, patch: &StylePatch) -> EngineResult<()> {
        let element = self.get_active_mut().ok_or(EngineError::NoActiveElement)?;
        element.style.apply(patch);
        Ok(())
    }

    /// Append a committed vertex to the line or arrow being created.
    ///
    /// Returns `true` when this finished the element (single-segment mode).
    pub fn append_vertex(&mut self, point: Point) -> EngineResult<bool> {
        let element = self.get_active_mut().ok_or(EngineError::NoActiveElement)?;
        if !element.is_being_created {
            return Err(EngineError::NoActiveElement);
        }
        let polyline = element.polyline_mut().ok_or(EngineError::NoActiveElement)?;
        polyline.points.push(PathPoint::from(point));
        let finished = polyline.single_segment && polyline.points.len() >= 2;
        element.refresh_bounds();
        if finished {
            self.complete_create()?;
        }
        Ok(finished)
    }

    /// Move the trailing preview vertex of the line or arrow being created.
    pub fn update_provisional_point(&mut self, point: Point) -> EngineResult<()> {
        let element = self.get_active_mut().ok_or(EngineError::NoActiveElement)?;
        if !element.is_being_created {
            return Err(EngineError::NoActiveElement);
        }
        let polyline = element.polyline_mut().ok_or(EngineError::NoActiveElement)?;
        polyline.provisional_point = Some(point);
        Ok(())
    }

    /// Finish creating the active element.
    ///
    /// Point-shapes get a final bounds recomputation and lose their preview
    /// vertex. Lines and arrows with fewer than two vertices and blank text
    /// elements are deleted instead. Returns the id of the element when it
    /// survives.
    pub fn complete_create(&mut self) -> EngineResult<Option<ElementId>> {
        let element = self.get_active_mut().ok_or(EngineError::NoActiveElement)?;
        let id = element.id();
        element.is_being_created = false;
        if let Some(polyline) = element.polyline_mut() {
            polyline.provisional_point = None;
        }
        element.refresh_bounds();
        let degenerate = match element.kind() {
            ElementKind::Line | ElementKind::Arrow => element.points().is_none_or(|p| p.len() < 2),
            ElementKind::Text => element.text().is_none_or(|t| t.is_blank()),
            _ => false,
        };
        if degenerate {
            self.delete(id);
            return Ok(None);
        }
        log::debug!("completed {id}");
        Ok(Some(id))
    }

    /// Replace the content of a text element and recompute its box.
    pub fn set_text(&mut self, id: ElementId, text: &str, measure: &dyn TextMeasure) -> EngineResult<()> {
        let element = self.get_mut(id).ok_or(EngineError::ElementNotFound(id))?;
        let data = element.text_mut().ok_or(EngineError::ElementNotFound(id))?;
        data.text = text.to_string();
        let (width, height) = data.measured_size(measure);
        element.width = width;
        element.height = height;
        Ok(())
    }

    /// Place a decoded image centred on `center`, at most `max_width` wide.
    ///
    /// The image is finished immediately and becomes active.
    pub fn create_image(
        &mut self,
        source_ref: &str,
        center: Point,
        decoder: &dyn ImageDecoder,
        max_width: f64,
    ) -> EngineResult<ElementId> {
        let size = decoder.decode(source_ref)?;
        let rect = placement_rect(size, center, max_width);
        let attrs = ElementAttrs {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            source_ref: Some(source_ref.to_string()),
            natural_aspect_ratio: Some(size.aspect_ratio()),
            ..ElementAttrs::default()
        };
        let id = self
            .create(ElementKind::Image.name(), &attrs)
            .ok_or_else(|| EngineError::UnknownKind(ElementKind::Image.name().to_string()))?;
        if let Some(element) = self.get_mut(id) {
            element.is_being_created = false;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitPart;
    use crate::shapes::{ApproximateTextMeasure, ImageSize, SerializableColor};

    fn rect_attrs(x: f64, y: f64, w: f64, h: f64) -> ElementAttrs {
        ElementAttrs {
            width: Some(w),
            height: Some(h),
            ..ElementAttrs::at(Point::new(x, y))
        }
    }

    struct FixedDecoder(ImageSize);

    impl ImageDecoder for FixedDecoder {
        fn decode(&self, source_ref: &str) -> EngineResult<ImageSize> {
            if source_ref.is_empty() {
                return Err(EngineError::ImageDecode("empty source".to_string()));
            }
            Ok(self.0)
        }
    }

    #[test]
    fn test_create_activates() {
        let mut store = ElementStore::new();
        let id = store.create("rectangle", &rect_attrs(0.0, 0.0, 10.0, 10.0)).unwrap();
        let active = store.get_active().unwrap();
        assert_eq!(active.id(), id);
        assert!(active.is_active);
        assert!(active.is_being_created);
    }

    #[test]
    fn test_create_unknown_kind() {
        let mut store = ElementStore::new();
        assert!(store.create("hexagon", &ElementAttrs::default()).is_none());
        assert!(store.is_empty());
        assert!(store.get_active().is_none());
    }

    #[test]
    fn test_single_active_element() {
        let mut store = ElementStore::new();
        let a = store.create("rectangle", &ElementAttrs::default()).unwrap();
        let b = store.create("circle", &ElementAttrs::default()).unwrap();
        assert!(!store.get(a).unwrap().is_active);
        assert!(store.get(b).unwrap().is_active);
        assert_eq!(store.list().iter().filter(|e| e.is_active).count(), 1);
    }

    #[test]
    fn test_selection_and_active_exclusive() {
        let mut store = ElementStore::new();
        let a = store.create("rectangle", &ElementAttrs::default()).unwrap();
        let b = store.create("diamond", &ElementAttrs::default()).unwrap();
        store.set_selection(vec![a, b]);
        assert!(store.get_active().is_none());
        assert!(store.list().iter().all(|e| !e.is_active));

        store.set_active(Some(a));
        assert_eq!(store.active_slot(), &ActiveSlot::Element(a));
    }

    #[test]
    fn test_delete_clears_active() {
        let mut store = ElementStore::new();
        let id = store.create("triangle", &ElementAttrs::default()).unwrap();
        assert!(store.delete(id).is_some());
        assert!(store.get_active().is_none());
        assert!(store.delete(id).is_none());
    }

    #[test]
    fn test_hit_test_topmost_wins() {
        let mut store = ElementStore::new();
        let fill = StylePatch {
            fill_color: Some(Some(SerializableColor::white())),
            ..StylePatch::default()
        };
        let back = store.create("rectangle", &rect_attrs(0.0, 0.0, 100.0, 100.0)).unwrap();
        store.set_active_style(&fill).unwrap();
        let front = store.create("rectangle", &rect_attrs(50.0, 50.0, 100.0, 100.0)).unwrap();
        store.set_active_style(&fill).unwrap();

        let hit = store.hit_test(Point::new(75.0, 75.0), &HitTester::default()).unwrap();
        assert_eq!(hit.id, front);
        assert_eq!(hit.part, HitPart::Inner);

        let hit = store.hit_test(Point::new(25.0, 25.0), &HitTester::default()).unwrap();
        assert_eq!(hit.id, back);
        assert!(store.hit_test(Point::new(500.0, 500.0), &HitTester::default()).is_none());
    }

    #[test]
    fn test_serialize_and_load() {
        let mut store = ElementStore::new();
        let id = store.create("circle", &rect_attrs(5.0, 6.0, 20.0, 30.0)).unwrap();
        let json = store.to_json().unwrap();

        let mut other = ElementStore::new();
        other.load_json(&json).unwrap();
        let loaded = other.get(id).unwrap();
        assert!(!loaded.is_active);
        assert!(!loaded.is_being_created);
        assert_eq!(loaded.position, Point::new(5.0, 6.0));
        assert!(other.get_active().is_none());
    }

    #[test]
    fn test_duplicate_offsets_copy() {
        let mut store = ElementStore::new();
        let id = store.create("rectangle", &rect_attrs(10.0, 10.0, 40.0, 40.0)).unwrap();
        let copy = store.duplicate(id, None, Vec2::new(20.0, 20.0), true).unwrap();
        assert_ne!(copy, id);
        let copied = store.get_active().unwrap();
        assert_eq!(copied.id(), copy);
        assert_eq!(copied.position, Point::new(30.0, 30.0));

        let placed = store.duplicate(id, Some(Point::new(200.0, 0.0)), Vec2::ZERO, false).unwrap();
        assert_eq!(store.get(placed).unwrap().position, Point::new(200.0, 0.0));
        assert_eq!(store.active_id(), Some(copy));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_multi_click_line() {
        let mut store = ElementStore::new();
        let attrs = ElementAttrs {
            points: Some(vec![PathPoint::new(0.0, 0.0)]),
            ..ElementAttrs::default()
        };
        let id = store.create("line", &attrs).unwrap();
        store.update_provisional_point(Point::new(50.0, 10.0)).unwrap();
        assert!(!store.append_vertex(Point::new(50.0, 10.0)).unwrap());
        assert!(!store.append_vertex(Point::new(80.0, 40.0)).unwrap());
        assert_eq!(store.complete_create().unwrap(), Some(id));

        let line = store.get(id).unwrap();
        assert!(!line.is_being_created);
        assert!(line.polyline().unwrap().provisional_point.is_none());
        assert_eq!(line.points().unwrap().len(), 3);
        assert!((line.width - 80.0).abs() < f64::EPSILON);
        assert!((line.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_segment_finishes_on_second_point() {
        let mut store = ElementStore::new();
        let attrs = ElementAttrs {
            points: Some(vec![PathPoint::new(0.0, 0.0)]),
            single_segment: Some(true),
            ..ElementAttrs::default()
        };
        let id = store.create("arrow", &attrs).unwrap();
        assert!(store.append_vertex(Point::new(30.0, 0.0)).unwrap());
        assert!(!store.get(id).unwrap().is_being_created);
    }

    #[test]
    fn test_degenerate_line_dropped() {
        let mut store = ElementStore::new();
        let attrs = ElementAttrs {
            points: Some(vec![PathPoint::new(0.0, 0.0)]),
            ..ElementAttrs::default()
        };
        store.create("line", &attrs).unwrap();
        assert_eq!(store.complete_create().unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_text_content_and_blank_removal() {
        let mut store = ElementStore::new();
        let measure = ApproximateTextMeasure::default();
        let id = store.create("text", &ElementAttrs::at(Point::new(10.0, 10.0))).unwrap();
        store.set_text(id, "Hello\nWorld!", &measure).unwrap();
        let text = store.get(id).unwrap();
        assert!((text.width - 6.0 * 18.0 * 0.55).abs() < 1e-9);
        assert!((text.height - 2.0 * 18.0 * 1.5).abs() < 1e-9);
        assert_eq!(store.complete_create().unwrap(), Some(id));

        let blank = store.create("text", &ElementAttrs::default()).unwrap();
        store.set_text(blank, "   ", &measure).unwrap();
        assert_eq!(store.complete_create().unwrap(), None);
        assert!(store.get(blank).is_none());
    }

    #[test]
    fn test_create_image() {
        let mut store = ElementStore::new();
        let decoder = FixedDecoder(ImageSize {
            pixel_width: 800,
            pixel_height: 400,
        });
        let id = store.create_image("cat.png", Point::new(300.0, 300.0), &decoder, 400.0).unwrap();
        let image = store.get(id).unwrap();
        assert!((image.width - 400.0).abs() < 1e-9);
        assert!((image.height - 200.0).abs() < 1e-9);
        assert_eq!(image.position, Point::new(100.0, 200.0));
        assert!((image.image().unwrap().natural_aspect_ratio - 2.0).abs() < 1e-9);
        assert!(!image.is_being_created);

        assert!(store.create_image("", Point::ZERO, &decoder, 400.0).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_style_without_active() {
        let mut store = ElementStore::new();
        assert!(matches!(
            store.set_active_style(&StylePatch::default()),
            Err(EngineError::NoActiveElement)
        ));
    }
}
