use std::sync::Arc;

use tracing::{debug, instrument};

use ecoquest_core::{ActionKind, Clock, DailyLimits, Username};
use ecoquest_state::{CounterStore, IncrementResult};

use crate::error::GatewayError;

/// Per-user, per-day admission control for gated actions.
///
/// The gate is the sole writer of daily counters. Admission and increment
/// happen in one atomic store operation; no lock is held afterwards.
pub struct QuotaGate {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    limits: DailyLimits,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, limits: DailyLimits) -> Self {
        Self {
            store,
            clock,
            limits,
        }
    }

    pub fn limits(&self) -> &DailyLimits {
        &self.limits
    }

    /// Admit one `kind` action for `user` today, returning the new count.
    ///
    /// Fails with [`GatewayError::QuotaExceeded`] without mutating anything
    /// once the counter has reached its limit.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn check_and_increment(
        &self,
        user: &Username,
        kind: ActionKind,
    ) -> Result<u32, GatewayError> {
        let limit = self.limits.limit(kind);
        let day = self.clock.today();

        match self
            .store
            .increment_within_limit(user, day, kind, limit)
            .await?
        {
            IncrementResult::Incremented(count) => {
                debug!(count, limit, %day, "quota slot consumed");
                Ok(count)
            }
            IncrementResult::LimitReached(count) => {
                debug!(count, limit, %day, "quota exhausted");
                Err(GatewayError::QuotaExceeded { kind, limit })
            }
        }
    }

    /// Like [`check_and_increment`](Self::check_and_increment), but takes the
    /// counter name. Unknown names fail before storage is touched.
    pub async fn check_and_increment_by_name(
        &self,
        user: &Username,
        kind: &str,
    ) -> Result<u32, GatewayError> {
        let kind: ActionKind = kind.parse()?;
        self.check_and_increment(user, kind).await
    }

    /// Slots left for `kind` after `count` have been used.
    pub fn remaining(&self, kind: ActionKind, count: u32) -> u32 {
        self.limits.limit(kind).saturating_sub(count)
    }
}
