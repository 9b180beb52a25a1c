//! Tinyboard Core Library
//!
//! Platform-agnostic geometry and interaction engine for a 2D drawing
//! surface: element model, viewport transform, hit testing, handle
//! gestures and pointer routing.

pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod handles;
pub mod hit_test;
pub mod input;
pub mod shapes;
pub mod snap;
pub mod store;
pub mod tools;
pub mod viewport;

pub use board::{Board, BoardSnapshot};
pub use config::EngineConfig;
pub use drag::{DragController, DragState, GestureMode};
pub use error::{EngineError, EngineResult};
pub use handles::Handle;
pub use hit_test::{HitPart, HitResult, HitTester};
pub use input::{EventKind, Modifiers, PointerEvent, PointerTracker};
pub use shapes::{Element, ElementAttrs, ElementId, ElementKind, ElementRecord, ElementStyle, StylePatch};
pub use snap::{snap_angle, snap_to_grid};
pub use store::{ActiveSlot, ElementStore};
pub use tools::ToolKind;
pub use viewport::Viewport;
