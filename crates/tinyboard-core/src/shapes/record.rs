//! Plain attribute records for copy/paste and persistence.

use super::{
    Element, ElementData, ElementId, ElementKind, ElementStyle, ImageData, PathPoint, Polyline,
    Stroke, TextData,
};
use crate::error::EngineResult;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Flat serialized form of an [`Element`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<PathPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional_point: Option<Point>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub single_segment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_aspect_ratio: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_being_created: bool,
}

impl ElementRecord {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Initial attributes for a newly created element. Unset fields keep the
/// element's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementAttrs {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub style: Option<ElementStyle>,
    pub points: Option<Vec<PathPoint>>,
    pub single_segment: Option<bool>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub line_height_ratio: Option<f64>,
    pub font_family: Option<String>,
    pub source_ref: Option<String>,
    pub natural_aspect_ratio: Option<f64>,
}

impl ElementAttrs {
    /// Attributes placing the element's box at `point`.
    pub fn at(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }
}

impl Element {
    /// Build a new element of `kind` from creation attributes.
    pub(crate) fn from_attrs(kind: ElementKind, attrs: &ElementAttrs) -> Self {
        let position = Point::new(attrs.x.unwrap_or(0.0), attrs.y.unwrap_or(0.0));
        let mut element = Element::new(kind, position)
            .with_size(attrs.width.unwrap_or(0.0), attrs.height.unwrap_or(0.0));
        element.rotation = attrs.rotation.unwrap_or(0.0);
        if let Some(style) = &attrs.style {
            element.style = style.clone();
        }
        match &mut element.data {
            ElementData::Box => {}
            ElementData::Polyline(line) => {
                line.single_segment = attrs.single_segment.unwrap_or(false);
            }
            ElementData::Stroke(_) => {}
            ElementData::Text(text) => {
                if let Some(content) = &attrs.text {
                    text.text = content.clone();
                }
                if let Some(size) = attrs.font_size {
                    text.font_size = size;
                }
                if let Some(ratio) = attrs.line_height_ratio {
                    text.line_height_ratio = ratio;
                }
                if let Some(family) = &attrs.font_family {
                    text.font_family = family.clone();
                }
            }
            ElementData::Image(image) => {
                if let Some(source) = &attrs.source_ref {
                    image.source_ref = source.clone();
                }
                if let Some(ratio) = attrs.natural_aspect_ratio {
                    image.natural_aspect_ratio = ratio;
                }
            }
        }
        if let Some(points) = &attrs.points {
            element = element.with_points(points.clone());
        }
        if let Some(stroke) = element.stroke_mut() {
            stroke.last_width = stroke.points.last().and_then(|p| p.width);
        }
        element
    }

    /// Plain attribute record of this element.
    pub fn to_record(&self) -> ElementRecord {
        let mut record = ElementRecord {
            id: self.id,
            kind: self.kind,
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            style: self.style.clone(),
            points: Vec::new(),
            provisional_point: None,
            single_segment: false,
            last_line_width: None,
            text: None,
            font_size: None,
            line_height_ratio: None,
            font_family: None,
            source_ref: None,
            natural_aspect_ratio: None,
            is_active: self.is_active,
            is_being_created: self.is_being_created,
        };
        match &self.data {
            ElementData::Box => {}
            ElementData::Polyline(line) => {
                record.points = line.points.clone();
                record.provisional_point = line.provisional_point;
                record.single_segment = line.single_segment;
            }
            ElementData::Stroke(stroke) => {
                record.points = stroke.points.clone();
                record.last_line_width = stroke.last_width;
            }
            ElementData::Text(text) => {
                record.text = Some(text.text.clone());
                record.font_size = Some(text.font_size);
                record.line_height_ratio = Some(text.line_height_ratio);
                record.font_family = Some(text.font_family.clone());
            }
            ElementData::Image(image) => {
                record.source_ref = Some(image.source_ref.clone());
                record.natural_aspect_ratio = Some(image.natural_aspect_ratio);
            }
        }
        record
    }

    /// Rebuild an element from its record, keeping the recorded id.
    pub fn from_record(record: &ElementRecord) -> Self {
        let data = match record.kind {
            ElementKind::Rectangle | ElementKind::Diamond | ElementKind::Triangle | ElementKind::Circle => {
                ElementData::Box
            }
            ElementKind::Line | ElementKind::Arrow => ElementData::Polyline(Polyline {
                points: record.points.clone(),
                provisional_point: record.provisional_point,
                single_segment: record.single_segment,
            }),
            ElementKind::Freedraw => ElementData::Stroke(Stroke {
                points: record.points.clone(),
                last_width: record.last_line_width,
            }),
            ElementKind::Text => {
                let defaults = TextData::default();
                ElementData::Text(TextData {
                    text: record.text.clone().unwrap_or_default(),
                    font_size: record.font_size.unwrap_or(defaults.font_size),
                    line_height_ratio: record.line_height_ratio.unwrap_or(defaults.line_height_ratio),
                    font_family: record.font_family.clone().unwrap_or(defaults.font_family),
                })
            }
            ElementKind::Image => ElementData::Image(ImageData {
                source_ref: record.source_ref.clone().unwrap_or_default(),
                natural_aspect_ratio: record.natural_aspect_ratio.unwrap_or(1.0),
            }),
        };
        let mut element = Element {
            id: record.id,
            kind: record.kind,
            position: Point::new(record.x, record.y),
            width: record.width,
            height: record.height,
            rotation: record.rotation,
            style: record.style.clone(),
            data,
            is_active: record.is_active,
            is_being_created: record.is_being_created,
        };
        element.refresh_bounds();
        element
    }
}
