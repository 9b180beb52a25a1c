//! Replays a recorded interaction script and prints the resulting board.
//!
//! Usage: `tinyboard-replay <script.json>`

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tinyboard_core::shapes::{ImageDecoder, ImageSize};
use tinyboard_core::{
    Board, BoardSnapshot, EngineConfig, EngineError, EngineResult, Handle, PointerEvent, StylePatch, ToolKind,
    Viewport,
};

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("usage: tinyboard-replay <script.json>")]
    Usage,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("failed to write board: {0}")]
    Output(serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A recorded session.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    viewport: Viewport,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Step {
    Tool(ToolKind),
    Event(PointerEvent),
    /// Replace the content of the active text element.
    Text(String),
    /// Style for new elements and the active one; colors may be hex strings.
    Style(StylePatch),
    Image { source: String, x: f64, y: f64 },
}

/// Final board plus the handles a host would draw for the active element.
#[derive(Debug, Serialize)]
struct ReplayOutput {
    board: BoardSnapshot,
    handles: Vec<(Handle, Point)>,
}

/// Reads image dimensions from files relative to the script.
struct FileDecoder {
    base: PathBuf,
}

impl ImageDecoder for FileDecoder {
    fn decode(&self, source_ref: &str) -> EngineResult<ImageSize> {
        let (pixel_width, pixel_height) = image::image_dimensions(self.base.join(source_ref))
            .map_err(|e| EngineError::ImageDecode(e.to_string()))?;
        Ok(ImageSize {
            pixel_width,
            pixel_height,
        })
    }
}

fn replay(path: &Path) -> Result<String, ReplayError> {
    let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let script: Script = serde_json::from_str(&json)?;
    let decoder = FileDecoder {
        base: path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let mut board = Board::new(script.config, script.viewport);
    for (index, step) in script.steps.iter().enumerate() {
        log::trace!("step {index}: {step:?}");
        match step {
            Step::Tool(tool) => board.set_tool(*tool),
            Step::Event(event) => board.handle_event(event),
            Step::Text(text) => {
                if let Err(e) = board.set_text(text) {
                    log::warn!("step {index}: {e}");
                }
            }
            Step::Style(patch) => board.set_style(patch),
            Step::Image { source, x, y } => {
                board.insert_image(source, Point::new(*x, *y), &decoder)?;
            }
        }
    }
    if board.store().get_active().is_some_and(|e| e.is_being_created) {
        board.finish_creation();
    }
    log::info!("replayed {} steps into {} elements", script.steps.len(), board.store().len());
    let output = ReplayOutput {
        board: board.snapshot(),
        handles: board.active_handles(),
    };
    serde_json::to_string_pretty(&output).map_err(ReplayError::Output)
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("{}", ReplayError::Usage);
        return ExitCode::FAILURE;
    };
    match replay(&path) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
