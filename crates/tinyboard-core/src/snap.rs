//! Snap functionality for aligning points to the grid and angles to steps.

use kurbo::Point;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Round a point to the nearest multiple of `grid_size` on both axes.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap an angle (degrees) to the nearest increment. Sign is preserved.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    (angle_degrees / increment).round() * increment
}

/// Normalize an angle to [0, 360).
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    angle_degrees.rem_euclid(360.0)
}
