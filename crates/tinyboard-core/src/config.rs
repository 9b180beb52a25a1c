//! Engine configuration.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};

/// Tunable constants for hit-testing, handles, snapping and creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stroke hit tolerance in world units.
    pub hit_tolerance: f64,
    /// Side length of a resize handle in world units.
    pub handle_size: f64,
    /// Distance from the top edge to the rotation handle.
    pub rotate_handle_offset: f64,
    /// Grid cell size used for snapping.
    pub grid_size: f64,
    /// Whether pointer positions snap to the grid.
    pub snap_to_grid: bool,
    /// Smallest font size the width fitting search starts from.
    pub min_font_size: f64,
    /// Largest font size the width fitting search will try.
    pub max_font_size: f64,
    /// Offset applied to pasted copies when no position is given.
    pub paste_offset: f64,
    /// Font size for new text elements.
    pub default_font_size: f64,
    /// Line height ratio for new text elements.
    pub default_line_height_ratio: f64,
    /// Font family for new text elements.
    pub default_font_family: String,
    /// Freedraw stroke width at rest (pointer not moving).
    pub freedraw_base_width: f64,
    /// Pointer speed (world units per millisecond) that halves freedraw width.
    pub freedraw_speed_scale: f64,
    /// Exponential smoothing factor applied to freedraw widths.
    pub freedraw_smoothing: f64,
    /// Images wider than this are scaled down when placed.
    pub image_max_width: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 10.0,
            handle_size: 16.0,
            rotate_handle_offset: 25.0,
            grid_size: 20.0,
            snap_to_grid: false,
            min_font_size: 12.0,
            max_font_size: 512.0,
            paste_offset: 20.0,
            default_font_size: 18.0,
            default_line_height_ratio: 1.5,
            default_font_family: "Microsoft YaHei".to_string(),
            freedraw_base_width: 4.0,
            freedraw_speed_scale: 1.5,
            freedraw_smoothing: 0.3,
            image_max_width: 400.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
