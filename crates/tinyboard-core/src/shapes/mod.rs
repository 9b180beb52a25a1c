//! Element definitions for the drawing surface.

mod image;
mod polyline;
mod record;
mod text;

pub use image::{ImageData, ImageDecoder, ImageSize};
pub(crate) use image::placement_rect;
pub use polyline::{PathPoint, Polyline, Stroke};
pub use record::{ElementAttrs, ElementRecord};
pub use text::{ApproximateTextMeasure, TextData, TextMeasure, fit_font_size, split_lines};

use crate::error::{EngineError, EngineResult};
use crate::geometry;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Serializable color representation (RGBA8).
///
/// Serialized as a hex string; `{r, g, b, a}` objects are also accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').filter(|d| d.is_ascii()).ok_or_else(invalid)?;
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?, 255))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Wire forms accepted for a color.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl TryFrom<ColorRepr> for SerializableColor {
    type Error = EngineError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) => Self::from_hex(hex.trim()),
            ColorRepr::Rgba { r, g, b, a } => Ok(Self::new(r, g, b, a)),
        }
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Parse a fill attribute; `"none"`, `"transparent"` and `""` mean no fill.
pub fn parse_fill(value: &str) -> EngineResult<Option<SerializableColor>> {
    match value.trim() {
        "" | "none" | "transparent" => Ok(None),
        hex => SerializableColor::from_hex(hex).map(Some),
    }
}

fn deserialize_fill<'de, D>(deserializer: D) -> Result<Option<SerializableColor>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<ColorRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ColorRepr::Hex(value)) => parse_fill(&value).map_err(serde::de::Error::custom),
        Some(repr) => SerializableColor::try_from(repr)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A present `fill_color` in a patch, `null` or `"none"` included, replaces the fill.
fn deserialize_fill_patch<'de, D>(deserializer: D) -> Result<Option<Option<SerializableColor>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_fill(deserializer).map(Some)
}

/// Stroke width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeWidth {
    #[default]
    Small,
    Medium,
    Large,
}

impl StrokeWidth {
    /// Width in world units.
    pub fn px(self) -> f64 {
        match self {
            StrokeWidth::Small => 2.0,
            StrokeWidth::Medium => 4.0,
            StrokeWidth::Large => 6.0,
        }
    }
}

/// Dash pattern for strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashPattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Style properties, opaque to the geometry engine and consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Fill color (None = no fill).
    #[serde(default, deserialize_with = "deserialize_fill")]
    pub fill_color: Option<SerializableColor>,
    /// Stroke width class.
    #[serde(default)]
    pub stroke_width: StrokeWidth,
    /// Dash pattern.
    #[serde(default)]
    pub dash: DashPattern,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            fill_color: None,
            stroke_width: StrokeWidth::default(),
            dash: DashPattern::default(),
            opacity: 1.0,
        }
    }
}

impl ElementStyle {
    /// Whether the interior counts as part of the element.
    pub fn has_fill(&self) -> bool {
        self.fill_color.is_some_and(|c| c.a > 0)
    }

    /// Apply the fields set in `patch`.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(stroke) = patch.stroke_color {
            self.stroke_color = stroke;
        }
        if let Some(fill) = patch.fill_color {
            self.fill_color = fill;
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(dash) = patch.dash {
            self.dash = dash;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

/// Partial style update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    pub stroke_color: Option<SerializableColor>,
    #[serde(deserialize_with = "deserialize_fill_patch")]
    pub fill_color: Option<Option<SerializableColor>>,
    pub stroke_width: Option<StrokeWidth>,
    pub dash: Option<DashPattern>,
    pub opacity: Option<f64>,
}

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Diamond,
    Triangle,
    Circle,
    Line,
    Arrow,
    Freedraw,
    Text,
    Image,
}

impl ElementKind {
    /// Name used in records and by hosts.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Diamond => "diamond",
            ElementKind::Triangle => "triangle",
            ElementKind::Circle => "circle",
            ElementKind::Line => "line",
            ElementKind::Arrow => "arrow",
            ElementKind::Freedraw => "freedraw",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }

    /// Kinds whose geometry is an ordered point sequence.
    pub fn is_point_shape(self) -> bool {
        matches!(self, ElementKind::Line | ElementKind::Arrow | ElementKind::Freedraw)
    }
}

impl FromStr for ElementKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(ElementKind::Rectangle),
            "diamond" => Ok(ElementKind::Diamond),
            "triangle" => Ok(ElementKind::Triangle),
            "circle" => Ok(ElementKind::Circle),
            "line" => Ok(ElementKind::Line),
            "arrow" => Ok(ElementKind::Arrow),
            "freedraw" => Ok(ElementKind::Freedraw),
            "text" => Ok(ElementKind::Text),
            "image" => Ok(ElementKind::Image),
            other => Err(EngineError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementData {
    /// Rectangle, diamond, triangle and circle carry no extra data.
    Box,
    /// Line and arrow vertices.
    Polyline(Polyline),
    /// Freehand stroke samples.
    Stroke(Stroke),
    Text(TextData),
    Image(ImageData),
}

impl ElementData {
    fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Rectangle | ElementKind::Diamond | ElementKind::Triangle | ElementKind::Circle => {
                ElementData::Box
            }
            ElementKind::Line | ElementKind::Arrow => ElementData::Polyline(Polyline::default()),
            ElementKind::Freedraw => ElementData::Stroke(Stroke::default()),
            ElementKind::Text => ElementData::Text(TextData::default()),
            ElementKind::Image => ElementData::Image(ImageData::default()),
        }
    }
}

/// A drawable element.
///
/// `position` is the top-left of the unrotated box; `rotation` (degrees) is
/// applied about the current centre. For point-shapes the box is always the
/// bounding rect of `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    /// Top-left of the bounding box.
    pub position: Point,
    /// Box width; may be negative mid-gesture.
    pub width: f64,
    /// Box height; may be negative mid-gesture.
    pub height: f64,
    /// Rotation in degrees about the centre.
    pub rotation: f64,
    /// Style properties.
    pub style: ElementStyle,
    /// Per-kind payload.
    pub data: ElementData,
    /// Whether this element occupies the active slot.
    pub is_active: bool,
    /// Whether the creation gesture is still running.
    pub is_being_created: bool,
}

impl Element {
    /// Create a new element of `kind` with its box at `position`.
    pub fn new(kind: ElementKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            style: ElementStyle::default(),
            data: ElementData::for_kind(kind),
            is_active: false,
            is_being_created: false,
        }
    }

    /// Set the box size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the point sequence of a point-shape; recomputes the box.
    pub fn with_points(mut self, points: Vec<PathPoint>) -> Self {
        if let Some(pts) = self.points_mut() {
            *pts = points;
        }
        self.refresh_bounds();
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_point_shape(&self) -> bool {
        self.kind.is_point_shape()
    }

    /// Current geometric centre, computed fresh from position and size.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// The unrotated box, normalized so that `x0 <= x1` and `y0 <= y1`.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }

    /// Replace position and size.
    pub fn set_rect(&mut self, position: Point, width: f64, height: f64) {
        self.position = position;
        self.width = width;
        self.height = height;
    }

    /// Point sequence of a point-shape.
    pub fn points(&self) -> Option<&[PathPoint]> {
        match &self.data {
            ElementData::Polyline(p) => Some(&p.points),
            ElementData::Stroke(s) => Some(&s.points),
            _ => None,
        }
    }

    /// Mutable point sequence of a point-shape.
    pub fn points_mut(&mut self) -> Option<&mut Vec<PathPoint>> {
        match &mut self.data {
            ElementData::Polyline(p) => Some(&mut p.points),
            ElementData::Stroke(s) => Some(&mut s.points),
            _ => None,
        }
    }

    /// Recompute position and size from the points of a point-shape.
    ///
    /// No-op for box-shapes and for point-shapes that have no points yet.
    pub fn refresh_bounds(&mut self) {
        let rect = match self.points() {
            Some(points) if !points.is_empty() => {
                geometry::bounding_rect(points.iter().map(PathPoint::point))
            }
            _ => return,
        };
        self.position = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Translate the whole element by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        if let Some(points) = self.points_mut() {
            for p in points.iter_mut() {
                *p = p.translated(delta);
            }
            self.refresh_bounds();
        } else {
            self.position += delta;
        }
    }

    /// Flip negative width/height into a positive box covering the same area.
    pub fn normalize_size(&mut self) {
        if self.width < 0.0 {
            self.position.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.position.y += self.height;
            self.height = -self.height;
        }
    }

    /// Text payload, for text elements.
    pub fn text(&self) -> Option<&TextData> {
        match &self.data {
            ElementData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable text payload, for text elements.
    pub fn text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.data {
            ElementData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Image payload, for image elements.
    pub fn image(&self) -> Option<&ImageData> {
        match &self.data {
            ElementData::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Line/arrow payload.
    pub fn polyline(&self) -> Option<&Polyline> {
        match &self.data {
            ElementData::Polyline(p) => Some(p),
            _ => None,
        }
    }

    /// Mutable line/arrow payload.
    pub fn polyline_mut(&mut self) -> Option<&mut Polyline> {
        match &mut self.data {
            ElementData::Polyline(p) => Some(p),
            _ => None,
        }
    }

    /// Freedraw payload.
    pub fn stroke(&self) -> Option<&Stroke> {
        match &self.data {
            ElementData::Stroke(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable freedraw payload.
    pub fn stroke_mut(&mut self) -> Option<&mut Stroke> {
        match &mut self.data {
            ElementData::Stroke(s) => Some(s),
            _ => None,
        }
    }

    /// Give the element a new unique identifier (used when pasting copies).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}
