//! Error types for configuration and generation

use thiserror::Error;

use crate::layout::RoomId;

/// Invalid or unreadable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map bounds must be positive, got {width}x{height}")]
    EmptyBounds { width: u32, height: u32 },

    #[error("at least one room size option is required")]
    NoRoomSizes,

    #[error("room size {width}x{height} must be positive")]
    EmptyRoomSize { width: u32, height: u32 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must lie in [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("attempt budget `{name}` must be at least 1")]
    ZeroBudget { name: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the generation pipeline
///
/// `PlacementExhausted` and `UnroutableEdge` end a single pipeline attempt and
/// trigger a restart. Callers of [`crate::generate`] only ever see
/// `GenerationExhausted` (carrying the last attempt's failure) or
/// `InvalidConfig`.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("placed {placed} of {requested} rooms after {attempts} attempts")]
    PlacementExhausted {
        placed: usize,
        requested: usize,
        attempts: u32,
    },

    #[error("could not route a corridor between rooms {a} and {b} in {attempts} attempts")]
    UnroutableEdge { a: RoomId, b: RoomId, attempts: u32 },

    #[error("generation failed after {attempts} attempts (last failure: {last_failure})")]
    GenerationExhausted {
        attempts: u32,
        last_failure: Box<GenerationError>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl GenerationError {
    /// Whether a fresh pipeline attempt could recover from this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::PlacementExhausted { .. } | GenerationError::UnroutableEdge { .. }
        )
    }
}
