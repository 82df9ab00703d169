//! Error taxonomy. Everything except `World` is raised at construction or registration time.

use steptween_api_core::WorldError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimelineError {
    #[error("invalid timeline option: {0}")]
    Configuration(String),

    #[error("\"{key}\" {reason}")]
    Parameter { key: String, reason: String },

    #[error("invalid position \"{expression}\": {reason}")]
    InvalidPosition { expression: String, reason: String },

    #[error(
        "tween on {target} [{start}, {end}) overlaps a previous tween [{other_start}, {other_end})"
    )]
    Overlap {
        target: String,
        start: f64,
        end: f64,
        other_start: f64,
        other_end: f64,
    },

    #[error(transparent)]
    World(#[from] WorldError),
}

impl TimelineError {
    pub(crate) fn parameter(key: &str, reason: impl Into<String>) -> Self {
        TimelineError::Parameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn position(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        TimelineError::InvalidPosition {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;
