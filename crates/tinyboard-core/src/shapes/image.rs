//! Image payload and the decoding collaborator.

use crate::error::EngineResult;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Natural pixel dimensions reported by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ImageSize {
    /// Width divided by height; 1.0 for degenerate images.
    pub fn aspect_ratio(&self) -> f64 {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            1.0
        } else {
            self.pixel_width as f64 / self.pixel_height as f64
        }
    }
}

/// Resolves a source reference (path, URL, data URI) to its natural size.
pub trait ImageDecoder {
    fn decode(&self, source_ref: &str) -> EngineResult<ImageSize>;
}

/// Image element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Where the renderer loads pixels from.
    pub source_ref: String,
    /// Natural width / height.
    pub natural_aspect_ratio: f64,
}

impl Default for ImageData {
    fn default() -> Self {
        Self {
            source_ref: String::new(),
            natural_aspect_ratio: 1.0,
        }
    }
}

/// Initial box for an image centred on `center`, scaled down so that it is
/// at most `max_width` wide while keeping its aspect ratio.
pub(crate) fn placement_rect(size: ImageSize, center: Point, max_width: f64) -> Rect {
    let mut width = size.pixel_width as f64;
    let mut height = size.pixel_height as f64;
    if width > max_width && max_width > 0.0 {
        height = max_width / size.aspect_ratio();
        width = max_width;
    }
    Rect::from_center_size(center, (width, height))
}
