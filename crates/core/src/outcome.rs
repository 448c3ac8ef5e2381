use serde::{Deserialize, Serialize};

/// Result of asking an external collaborator for data.
///
/// `Fallback` carries synthetic data (mock values, simulated forecasts) so
/// callers can tell demo data apart from a live provider answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProviderOutcome<T> {
    /// Data came from the live provider.
    Success { data: T, source: String },
    /// The live provider had nothing usable; synthetic data was substituted.
    Fallback { data: T, reason: String },
    /// No data could be produced.
    Failure { reason: String },
}

impl<T> ProviderOutcome<T> {
    pub fn success(data: T, source: impl Into<String>) -> Self {
        Self::Success {
            data,
            source: source.into(),
        }
    }

    pub fn fallback(data: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            data,
            reason: reason.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Borrow the data, if any.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } | Self::Fallback { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Transform the carried data, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProviderOutcome<U> {
        match self {
            Self::Success { data, source } => ProviderOutcome::Success {
                data: f(data),
                source,
            },
            Self::Fallback { data, reason } => ProviderOutcome::Fallback {
                data: f(data),
                reason,
            },
            Self::Failure { reason } => ProviderOutcome::Failure { reason },
        }
    }
}
