use std::sync::Arc;

use tracing::{info, instrument};

use ecoquest_core::{LeaderboardEntry, Username};
use ecoquest_state::CounterStore;

use crate::error::GatewayError;

/// Cumulative point balances.
///
/// Every operation is a single atomic store call, so concurrent awards for
/// the same user never lose updates.
pub struct PointsLedger {
    store: Arc<dyn CounterStore>,
}

impl PointsLedger {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Credit a positive `amount` for a completed action. Returns the new
    /// balance.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn award(&self, user: &Username, amount: i64) -> Result<i64, GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::InvalidInput(format!(
                "award amount must be positive, got {amount}"
            )));
        }
        Ok(self.store.add_points(user, amount).await?)
    }

    /// Administrative correction; `delta` may be negative but the balance is
    /// floored at zero. Not quota-gated.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn adjust(&self, user: &Username, delta: i64) -> Result<i64, GatewayError> {
        let balance = self.store.add_points(user, delta).await?;
        info!(delta, balance, "points adjusted");
        Ok(balance)
    }

    /// Current balance; creates a zero balance for unseen users.
    pub async fn get_balance(&self, user: &Username) -> Result<i64, GatewayError> {
        Ok(self.store.points(user).await?)
    }

    /// Top `top_n` users by balance, ties broken by username.
    pub async fn leaderboard(&self, top_n: usize) -> Result<Vec<LeaderboardEntry>, GatewayError> {
        Ok(self.store.top_users(top_n).await?)
    }
}
