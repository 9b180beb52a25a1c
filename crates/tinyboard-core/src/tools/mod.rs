//! Drawing tools.

use crate::error::EngineError;
use crate::shapes::ElementKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Diamond,
    Triangle,
    Circle,
    /// Straight line, finished on its second vertex.
    Line,
    /// Multi-vertex line, finished by double-click or Escape.
    Polyline,
    Arrow,
    Freedraw,
    Text,
}

impl ToolKind {
    /// Kind of element the tool creates.
    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Rectangle => Some(ElementKind::Rectangle),
            ToolKind::Diamond => Some(ElementKind::Diamond),
            ToolKind::Triangle => Some(ElementKind::Triangle),
            ToolKind::Circle => Some(ElementKind::Circle),
            ToolKind::Line | ToolKind::Polyline => Some(ElementKind::Line),
            ToolKind::Arrow => Some(ElementKind::Arrow),
            ToolKind::Freedraw => Some(ElementKind::Freedraw),
            ToolKind::Text => Some(ElementKind::Text),
        }
    }

    /// Tools that drag out a width/height box.
    pub fn drags_box(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Diamond | ToolKind::Triangle | ToolKind::Circle
        )
    }

    /// Tools that place vertices one click at a time.
    pub fn places_vertices(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Polyline | ToolKind::Arrow)
    }

    /// Whether the created line finishes on its second vertex.
    pub fn single_segment(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Arrow)
    }
}

impl FromStr for ToolKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(ToolKind::Select),
            "rectangle" => Ok(ToolKind::Rectangle),
            "diamond" => Ok(ToolKind::Diamond),
            "triangle" => Ok(ToolKind::Triangle),
            "circle" => Ok(ToolKind::Circle),
            "line" => Ok(ToolKind::Line),
            "polyline" => Ok(ToolKind::Polyline),
            "arrow" => Ok(ToolKind::Arrow),
            "freedraw" => Ok(ToolKind::Freedraw),
            "text" => Ok(ToolKind::Text),
            other => Err(EngineError::UnknownKind(other.to_string())),
        }
    }
}
