use ecoquest_core::{ActionKind, CoreError};
use thiserror::Error;

/// Errors that can occur while gating, metering, or orchestrating an action.
///
/// Provider failures are not errors here: they are reported inside the
/// action response so the caller still sees quota context.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An error occurred in the counter store.
    #[error("state error: {0}")]
    State(#[from] ecoquest_state::StateError),

    /// The user has used up today's allowance for this action kind.
    #[error("daily limit reached for {kind}")]
    QuotaExceeded { kind: ActionKind, limit: u32 },

    /// The action kind name is not one of the known counters.
    #[error("invalid action kind: {0}")]
    InvalidActionKind(String),

    #[error("username must not be empty")]
    InvalidUsername,

    /// The carbon activity is not in the supported taxonomy.
    #[error("{0}")]
    UnsupportedActivity(String),

    /// Any other caller input problem.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The gateway was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidActionKind(name) => Self::InvalidActionKind(name),
            CoreError::InvalidUsername => Self::InvalidUsername,
        }
    }
}

impl From<ecoquest_provider::UnsupportedActivity> for GatewayError {
    fn from(err: ecoquest_provider::UnsupportedActivity) -> Self {
        Self::UnsupportedActivity(err.to_string())
    }
}
