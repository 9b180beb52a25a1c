//! Error types for engine operations.

use crate::shapes::ElementId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the geometry and interaction engine.
///
/// Errors caused by user interaction are absorbed by the public surface
/// (logged and turned into no-ops); only `DegenerateGeometry` signals a
/// broken internal invariant.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Creation requested with a kind string that names no element type.
    #[error("Unknown element kind: {0}")]
    UnknownKind(String),

    /// A gesture operation was invoked with nothing active.
    #[error("No active element")]
    NoActiveElement,

    /// A handle identifier that is not part of the handle enumeration.
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// Bounding rect requested for an empty point sequence.
    #[error("Bounding rect of an empty point sequence")]
    DegenerateGeometry,

    /// The referenced element is not in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// A color string that could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Record or board (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The image-decoding collaborator could not size an image.
    #[error("Image decode failed: {0}")]
    ImageDecode(String),
}
