use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use ecoquest_core::{ActionKind, DailyActions, LeaderboardEntry, Username};
use ecoquest_state::error::StateError;
use ecoquest_state::store::{CounterStore, IncrementResult};

/// In-memory [`CounterStore`] backed by [`DashMap`]s.
///
/// The conditional increment runs while holding the shard write guard for
/// the `(user, day)` entry, so check and bump are atomic. All operations are
/// synchronous internally; the async trait methods return immediately.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    points: DashMap<Username, i64>,
    days: DashMap<(Username, NaiveDate), DailyActions>,
}

impl MemoryCounterStore {
    /// Create a new, empty in-memory counter store.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_user(&self, user: &Username) {
        self.points.entry(user.clone()).or_insert(0);
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_within_limit(
        &self,
        user: &Username,
        day: NaiveDate,
        kind: ActionKind,
        limit: u32,
    ) -> Result<IncrementResult, StateError> {
        self.ensure_user(user);

        let mut record = self.days.entry((user.clone(), day)).or_default();
        let counter = record.count_mut(kind);
        if *counter >= limit {
            return Ok(IncrementResult::LimitReached(*counter));
        }
        *counter += 1;
        Ok(IncrementResult::Incremented(*counter))
    }

    async fn daily_actions(
        &self,
        user: &Username,
        day: NaiveDate,
    ) -> Result<DailyActions, StateError> {
        self.ensure_user(user);
        Ok(*self.days.entry((user.clone(), day)).or_default())
    }

    async fn add_points(&self, user: &Username, delta: i64) -> Result<i64, StateError> {
        let mut balance = self.points.entry(user.clone()).or_insert(0);
        let next = balance
            .checked_add(delta)
            .ok_or_else(|| StateError::Backend(format!("points overflow for {user}")))?;
        *balance = next.max(0);
        Ok(*balance)
    }

    async fn points(&self, user: &Username) -> Result<i64, StateError> {
        Ok(*self.points.entry(user.clone()).or_insert(0))
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StateError> {
        let mut entries: Vec<LeaderboardEntry> = self
            .points
            .iter()
            .map(|item| LeaderboardEntry {
                username: item.key().clone(),
                points: *item.value(),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.username.cmp(&b.username))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}
