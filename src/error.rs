//! Configuration errors
//!
//! The engine only fails at construction. Runtime operations clamp instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("board needs at least one slot multiplier")]
    NoSlots,
    #[error("board dimensions must be positive and finite (got {width}x{height})")]
    InvalidDimensions { width: f32, height: f32 },
    #[error("board width {width} leaves no room between side margins (need more than {min})")]
    BoardTooNarrow { width: f32, min: f32 },
    #[error("board height {height} leaves no room between top and bottom margins (need more than {min})")]
    BoardTooShort { height: f32, min: f32 },
    #[error("slot {index} multiplier {value} must be finite and non-negative")]
    InvalidMultiplier { index: usize, value: f32 },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),
}
