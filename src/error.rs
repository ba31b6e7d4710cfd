//! Engine error taxonomy
//!
//! Configuration errors surface from construction, offset errors from `start`,
//! and frame faults from `tick`. A frame fault stops the engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Drawing surface unavailable: {0}")]
    MissingSurface(String),
    #[error("Drawing surface has zero size ({width}x{height})")]
    ZeroSizedSurface { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Drop offset {offset} is outside the bucket row ({left}..{right})")]
    OffsetOutOfRange { offset: f64, left: f64, right: f64 },
    #[error("Engine has been stopped")]
    Stopped,
    #[error("Drawing surface fault: {0}")]
    Surface(String),
    #[error("Token {token} reached a non-finite position or velocity")]
    CorruptState { token: u32 },
}

impl EngineError {
    /// Frame faults halt the loop; everything else is reported to the caller only
    pub fn is_frame_fault(&self) -> bool {
        matches!(self, EngineError::Surface(_) | EngineError::CorruptState { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}
