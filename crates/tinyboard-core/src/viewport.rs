//! Viewport state and the device/world coordinate transform.

use crate::geometry;
use crate::snap;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom scale.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom scale.
pub const MAX_ZOOM: f64 = 10.0;

/// Viewport maps device pixels to world coordinates and back.
///
/// Scroll is a positive-down offset: rendering subtracts it, so pointer
/// mapping adds it back. Zoom scales about the canvas centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Horizontal scroll offset in world units.
    pub scroll_x: f64,
    /// Vertical scroll offset in world units (positive = scrolled down).
    pub scroll_y: f64,
    /// Zoom scale (1.0 = 100%).
    pub zoom: f64,
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport for a canvas of the given CSS size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Transform from world coordinates to device pixels.
    pub fn transform(&self) -> Affine {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        Affine::scale(self.device_pixel_ratio)
            * Affine::translate(half)
            * Affine::scale(self.zoom)
            * Affine::translate(-half - Vec2::new(self.scroll_x, self.scroll_y))
    }

    /// Transform from device pixels to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    /// Convert a device pointer position to world coordinates.
    pub fn to_world(&self, device: Point) -> Point {
        self.inverse_transform() * device
    }

    /// Convert a world position to device pixels.
    pub fn to_device(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// Convert to world coordinates, snapping to the grid when enabled.
    pub fn to_world_snapped(&self, device: Point, grid: Option<f64>) -> Point {
        let world = self.to_world(device);
        match grid {
            Some(cell) => snap::snap_to_grid(world, cell),
            None => world,
        }
    }

    /// Rotate a world point into the unrotated frame around `center`.
    pub fn reverse_rotate(&self, point: Point, center: Point, angle_deg: f64) -> Point {
        geometry::reverse_rotate(point, center, angle_deg)
    }

    /// Scroll by a world-space delta.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll_x += delta.x;
        self.scroll_y += delta.y;
    }

    /// Set the zoom scale, clamped to the supported range. NaN is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Bring zoom and pixel ratio of a deserialized viewport back into a
    /// range where the transform stays invertible.
    pub fn clamped(mut self) -> Self {
        let zoom = self.zoom;
        self.zoom = 1.0;
        self.set_zoom(zoom);
        if !(self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0) {
            self.device_pixel_ratio = 1.0;
        }
        self
    }

    /// Resize the canvas.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identity_viewport() {
        let viewport = Viewport::new(800.0, 600.0);
        let p = viewport.to_world(Point::new(123.0, 456.0));
        assert!((p.x - 123.0).abs() < EPS);
        assert!((p.y - 456.0).abs() < EPS);
    }

    #[test]
    fn test_scroll_is_added_to_pointer_y() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scroll_y = 250.0;
        let p = viewport.to_world(Point::new(100.0, 100.0));
        assert!((p.x - 100.0).abs() < EPS);
        assert!((p.y - 350.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_about_center() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.zoom = 2.0;
        // Canvas centre is a fixed point of the zoom.
        let center = viewport.to_world(Point::new(400.0, 300.0));
        assert!((center.x - 400.0).abs() < EPS);
        assert!((center.y - 300.0).abs() < EPS);
        let p = viewport.to_world(Point::new(600.0, 300.0));
        assert!((p.x - 500.0).abs() < EPS);
    }

    #[test]
    fn test_device_pixel_ratio() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.device_pixel_ratio = 2.0;
        let p = viewport.to_world(Point::new(200.0, 100.0));
        assert!((p.x - 100.0).abs() < EPS);
        assert!((p.y - 50.0).abs() < EPS);
    }

    #[test]
    fn test_clamped_after_load() {
        let viewport: Viewport =
            serde_json::from_str(r#"{ "zoom": 0, "device_pixel_ratio": 0, "scroll_y": 10 }"#).unwrap();
        let viewport = viewport.clamped();
        assert!((viewport.zoom - MIN_ZOOM).abs() < EPS);
        assert!((viewport.device_pixel_ratio - 1.0).abs() < EPS);
        let p = viewport.to_world(Point::new(400.0, 300.0));
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!((p.y - 310.0).abs() < EPS);

        let mut viewport = Viewport::default();
        viewport.zoom = f64::NAN;
        assert!((viewport.clamped().zoom - 1.0).abs() < EPS);

        let mut viewport = Viewport::default();
        viewport.set_zoom(50.0);
        assert!((viewport.zoom - MAX_ZOOM).abs() < EPS);
        viewport.set_zoom(f64::NAN);
        assert!((viewport.zoom - MAX_ZOOM).abs() < EPS);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for &(scroll_y, zoom) in &[(0.0, 1.0), (120.5, 0.25), (-40.0, 3.7), (9000.0, 10.0)] {
            let viewport = Viewport {
                scroll_x: 17.0,
                scroll_y,
                zoom,
                width: 1024.0,
                height: 768.0,
                device_pixel_ratio: 1.5,
            };
            let original = Point::new(321.0, 654.0);
            let back = viewport.to_device(viewport.to_world(original));
            assert!((back.x - original.x).abs() < 1e-6);
            assert!((back.y - original.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_snapped_conversion() {
        let viewport = Viewport::new(800.0, 600.0);
        let p = viewport.to_world_snapped(Point::new(33.0, 48.0), Some(20.0));
        assert!((p.x - 40.0).abs() < EPS);
        assert!((p.y - 40.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(0.001);
        assert!((viewport.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        viewport.set_zoom(1000.0);
        assert!((viewport.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }
}
