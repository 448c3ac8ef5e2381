use async_trait::async_trait;
use chrono::NaiveDate;

use ecoquest_core::{ActionKind, DailyActions, LeaderboardEntry, Username};

use crate::error::StateError;

/// Result of a conditional counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementResult {
    /// The counter was below the limit and now holds this value.
    Incremented(u32),
    /// The counter already sat at (or above) the limit; nothing was written.
    LimitReached(u32),
}

/// Durable storage for per-day action counters and cumulative points.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Every method is a single logical transaction: a failure leaves no partial
/// mutation behind.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Ensure the user row and the `(user, day)` record exist, then bump the
    /// `kind` counter by one if it is strictly below `limit`.
    ///
    /// The check and the increment are atomic per `(user, day, kind)`: two
    /// callers racing at `limit - 1` never both succeed.
    async fn increment_within_limit(
        &self,
        user: &Username,
        day: NaiveDate,
        kind: ActionKind,
        limit: u32,
    ) -> Result<IncrementResult, StateError>;

    /// Counters for `(user, day)`, creating a zeroed record if absent.
    async fn daily_actions(
        &self,
        user: &Username,
        day: NaiveDate,
    ) -> Result<DailyActions, StateError>;

    /// Atomically add `delta` (which may be negative) to the user's balance,
    /// creating the user at zero first. The balance never drops below zero.
    /// Returns the new balance.
    async fn add_points(&self, user: &Username, delta: i64) -> Result<i64, StateError>;

    /// Current balance, creating the user at zero if absent.
    async fn points(&self, user: &Username) -> Result<i64, StateError>;

    /// Up to `limit` users ordered by points descending, ties by username
    /// ascending.
    async fn top_users(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StateError>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}
