//! Text payload and text measurement.

use serde::{Deserialize, Serialize};

/// Measures the rendered width of a single line of text.
///
/// Hosts back this with real font metrics; [`ApproximateTextMeasure`] is a
/// metrics-free fallback.
pub trait TextMeasure {
    fn measure_width(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

/// Estimates width from character count and font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub char_width_factor: f64,
}

impl Default for ApproximateTextMeasure {
    fn default() -> Self {
        Self {
            char_width_factor: 0.55,
        }
    }
}

impl TextMeasure for ApproximateTextMeasure {
    fn measure_width(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size * self.char_width_factor
    }
}

/// Text content and font settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    /// Content; may contain line breaks.
    pub text: String,
    pub font_size: f64,
    pub line_height_ratio: f64,
    pub font_family: String,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 18.0,
            line_height_ratio: 1.5,
            font_family: "Microsoft YaHei".to_string(),
        }
    }
}

impl TextData {
    /// Number of lines; empty text still occupies one line.
    pub fn line_count(&self) -> usize {
        split_lines(&self.text).len().max(1)
    }

    /// Width of the widest line at `font_size`.
    pub fn widest_line(&self, measure: &dyn TextMeasure, font_size: f64) -> f64 {
        split_lines(&self.text)
            .iter()
            .map(|line| measure.measure_width(line, font_size, &self.font_family))
            .fold(0.0, f64::max)
    }

    /// Box size for the current content and font size.
    pub fn measured_size(&self, measure: &dyn TextMeasure) -> (f64, f64) {
        let width = self.widest_line(measure, self.font_size);
        let height = self.line_count() as f64 * self.font_size * self.line_height_ratio;
        (width, height)
    }

    /// Whether the content is empty once whitespace is ignored.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split text into lines, treating `\r\n` and lone `\r` as line breaks.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Largest font size that fits `target_width` and `target_height`.
///
/// The width search walks upward one unit at a time from `min_size` while
/// the next size still measures narrower than the target, stopping at
/// `max_size`. The height bound is `floor(height / lines / line_height_ratio)`.
pub fn fit_font_size(
    data: &TextData,
    target_width: f64,
    target_height: f64,
    measure: &dyn TextMeasure,
    min_size: f64,
    max_size: f64,
) -> f64 {
    let mut from_width = min_size;
    while from_width + 1.0 <= max_size && data.widest_line(measure, from_width + 1.0) < target_width {
        from_width += 1.0;
    }
    let from_height = (target_height / data.line_count() as f64 / data.line_height_ratio).floor();
    from_width.min(from_height)
}
