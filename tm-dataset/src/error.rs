//! This module contains [`ConfigError`].

use tm_geometry::{ParseColourError, TreeDimensions};
use thiserror::Error;

/// The error returned when a dataset can't be built from its configuration.
///
/// Every one of these is caught before any record is generated, so a bad configuration never
/// lets a NaN or an infinity into the per-frame maths.
#[derive(Clone, Debug, PartialEq, Error)]
#[allow(missing_docs, reason = "the #[error] attributes document the variants")]
pub enum ConfigError {
    #[error("A dataset must have at least one record")]
    ZeroCount,

    #[error("Weight must be finite and greater than zero, got {0}")]
    InvalidWeight(f32),

    #[error("Speed must be finite, got {0}")]
    InvalidSpeed(f32),

    #[error("Scale must be finite and non-negative, got {0}")]
    InvalidScale(f32),

    #[error("A colour palette must contain at least one colour")]
    EmptyPalette,

    #[error("Malformed colour in palette: {0}")]
    MalformedColour(#[from] ParseColourError),

    #[error("Scale range must satisfy 0 <= min <= max with finite bounds, got ({min}, {max})")]
    InvalidScaleRange { min: f32, max: f32 },

    #[error("Tree dimensions must all be finite and positive, got {0:?}")]
    InvalidDimensions(TreeDimensions),

    #[error("Height bias exponent must be finite and positive, got {0}")]
    InvalidBias(f32),

    #[error("Jitter amplitude must be finite and non-negative, got {0}")]
    InvalidJitter(f32),

    #[error("Morph speed must be finite and positive, got {0}")]
    InvalidMorphSpeed(f32),

    #[error("Snap epsilon must be finite and non-negative, got {0}")]
    InvalidSnapEpsilon(f32),

    #[error("Motion parameter {field} is out of range, got {value}")]
    InvalidMotion { field: &'static str, value: f32 },

    #[error("Glow intensity must be finite and non-negative, got {0}")]
    InvalidGlowIntensity(f32),

    #[error("Record {index} has a non-finite position")]
    NonFinitePosition { index: usize },
}
