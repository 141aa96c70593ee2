/// Convenience result type used across racebar.
pub type RaceResult<T> = Result<T, RaceError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these are fatal: callers recover by fixing input, choosing another
/// statistic, or correcting configuration.
#[derive(thiserror::Error, Debug)]
pub enum RaceError {
    /// A raw record could not be turned into an observation.
    #[error("validation error: {0}")]
    Validation(String),

    /// No observations exist for the requested statistic.
    #[error("empty selection: no observations for statistic '{statistic}'")]
    EmptySelection {
        /// The statistic key that matched nothing.
        statistic: String,
    },

    /// Rejected configuration (detected before any frame is produced).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A frame sink failed to accept an event.
    #[error("sink error: {0}")]
    Sink(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RaceError {
    /// Build a [`RaceError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RaceError::EmptySelection`] value.
    pub fn empty_selection(statistic: impl Into<String>) -> Self {
        Self::EmptySelection {
            statistic: statistic.into(),
        }
    }

    /// Build a [`RaceError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`RaceError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`RaceError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
