use thiserror::Error;

/// Errors raised while validating caller-supplied domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid action kind: {0}")]
    InvalidActionKind(String),

    #[error("username must not be empty")]
    InvalidUsername,
}
