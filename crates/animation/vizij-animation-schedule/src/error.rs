//! Error types for animation schedules

use serde::{Deserialize, Serialize};

/// Which matrix of a transform animation could not be decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixRole {
    /// The final (`to`) matrix.
    To,
    /// The initial (`from`) matrix.
    From,
}

impl MatrixRole {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::From => "from",
        }
    }
}

/// Errors raised while compiling or starting a schedule.
///
/// Every variant except [`ScheduleError::Backend`] is a programming error: it is
/// reported before any animation is started and is never worth retrying.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScheduleError {
    /// A descriptor asks a backend for something it cannot do
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// A transform matrix has no scale/rotation/translation decomposition
    #[error("Transform decomposition failed for the '{}' matrix", .matrix.name())]
    Decomposition { matrix: MatrixRole },

    /// An argument is outside of its accepted range
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// A backend reported a failure while creating or starting an animation
    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

impl ScheduleError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a backend error. Intended for backend implementations.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by the caller's schedule or arguments
    /// rather than by a backend.
    #[inline]
    pub fn is_programming_error(&self) -> bool {
        !matches!(self, Self::Backend { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Decomposition { .. } => "decomposition",
            Self::InvalidArgument { .. } => "argument",
            Self::Backend { .. } => "backend",
        }
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArgument {
            name: "json".to_string(),
            reason: err.to_string(),
        }
    }
}
