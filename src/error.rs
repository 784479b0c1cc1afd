//! Errors reported by frame owners.

use std::any::Any;

use thiserror::Error;

/// Why a checked operation on a generator or task could not proceed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The owner holds no frame: it was default-constructed or taken from.
    #[error("no frame is owned")]
    Null,

    /// The frame already ran past its final suspension point.
    #[error("frame has already run to completion")]
    Finished,

    /// The body panicked while being resumed.
    #[error("frame body panicked: {message}")]
    Panicked { message: String },
}

impl FrameError {
    /// Builds a [`FrameError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_owned()
        };

        FrameError::Panicked { message }
    }
}

/// Result type of checked frame operations.
pub type Result<T, E = FrameError> = std::result::Result<T, E>;
