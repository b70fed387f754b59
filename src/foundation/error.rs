/// Convenience result type used across tilelink.
pub type GridResult<T> = Result<T, GridError>;

/// Error taxonomy for the construction and configuration boundary.
///
/// Playback itself never fails: malformed rounds, unresolvable tiles and
/// missing host capabilities all degrade silently.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// Invalid grid dimensions, subgrid regions or other structural input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration values that parse but cannot be used.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing block configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GridError {
    /// Build a [`GridError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GridError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`GridError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
