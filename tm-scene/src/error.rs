//! This module contains [`SceneError`].

use std::io;
use thiserror::Error;
use tm_dataset::ConfigError;

/// The error returned when a scene can't be loaded, built, or reconfigured.
#[derive(Debug, Error)]
#[allow(missing_docs, reason = "the #[error] attributes document the variants")]
pub enum SceneError {
    #[error("Invalid scene configuration: {0}")]
    Invalid(#[from] ConfigError),

    #[error("Two layers are both called {0:?}")]
    DuplicateLayer(String),

    #[error("There is no layer called {0:?}")]
    UnknownLayer(String),

    #[error("Failed to read or write the config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse the config file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize the config: {0}")]
    Serialize(#[from] ron::Error),
}
