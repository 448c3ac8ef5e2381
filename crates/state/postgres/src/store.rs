use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use ecoquest_core::{ActionKind, DailyActions, LeaderboardEntry, Username};
use ecoquest_state::error::StateError;
use ecoquest_state::store::{CounterStore, IncrementResult};

use crate::config::PostgresConfig;
use crate::migrations;

/// PostgreSQL-backed implementation of [`CounterStore`].
///
/// Every trait method runs in its own transaction. The gate uses a
/// conditional `UPDATE ... WHERE col < limit RETURNING col`, which takes the
/// row lock and re-checks the predicate against the latest committed value,
/// so concurrent callers cannot both pass at `limit - 1`.
pub struct PostgresCounterStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

fn backend(e: sqlx::Error) -> StateError {
    StateError::Backend(e.to_string())
}

/// Column backing a given action kind. Never built from caller input.
fn counter_column(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::AqiCheck => "aqi_checks",
        ActionKind::ForecastCheck => "forecast_checks",
        ActionKind::CarbonCalculation => "carbon_calculations",
    }
}

fn to_count(value: i32) -> Result<u32, StateError> {
    u32::try_from(value).map_err(|_| StateError::Serialization(format!("negative counter {value}")))
}

impl PostgresCounterStore {
    /// Create a new `PostgresCounterStore` from the provided configuration.
    ///
    /// Connects to `PostgreSQL`, creates the connection pool, and runs
    /// migrations to ensure the required tables exist.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if pool creation fails, or
    /// [`StateError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StateError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a `PostgresCounterStore` from an existing pool and config.
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StateError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(backend)?;
        debug!(
            users = %config.users_table(),
            daily_actions = %config.daily_actions_table(),
            "postgres counter store ready"
        );

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// Idempotently create the user row and the `(user, day)` record.
    async fn ensure_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &Username,
        day: NaiveDate,
    ) -> Result<(), StateError> {
        let users = self.config.users_table();
        let daily = self.config.daily_actions_table();

        let insert_user =
            format!("INSERT INTO {users} (username) VALUES ($1) ON CONFLICT (username) DO NOTHING");
        sqlx::query(&insert_user)
            .bind(user.as_str())
            .execute(&mut **tx)
            .await
            .map_err(backend)?;

        let insert_day = format!(
            "INSERT INTO {daily} (username, day) VALUES ($1, $2) \
             ON CONFLICT (username, day) DO NOTHING"
        );
        sqlx::query(&insert_day)
            .bind(user.as_str())
            .bind(day)
            .execute(&mut **tx)
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn ensure_user(&self, user: &Username) -> Result<(), StateError> {
        let users = self.config.users_table();
        let insert_user =
            format!("INSERT INTO {users} (username) VALUES ($1) ON CONFLICT (username) DO NOTHING");
        sqlx::query(&insert_user)
            .bind(user.as_str())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    async fn increment_within_limit(
        &self,
        user: &Username,
        day: NaiveDate,
        kind: ActionKind,
        limit: u32,
    ) -> Result<IncrementResult, StateError> {
        let daily = self.config.daily_actions_table();
        let col = counter_column(kind);
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        let mut tx = self.pool.begin().await.map_err(backend)?;
        self.ensure_record(&mut tx, user, day).await?;

        let update = format!(
            "UPDATE {daily} SET {col} = {col} + 1 \
             WHERE username = $1 AND day = $2 AND {col} < $3 \
             RETURNING {col}"
        );
        let updated: Option<(i32,)> = sqlx::query_as(&update)
            .bind(user.as_str())
            .bind(day)
            .bind(limit)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;

        let result = if let Some((count,)) = updated {
            IncrementResult::Incremented(to_count(count)?)
        } else {
            let select = format!("SELECT {col} FROM {daily} WHERE username = $1 AND day = $2");
            let (count,): (i32,) = sqlx::query_as(&select)
                .bind(user.as_str())
                .bind(day)
                .fetch_one(&mut *tx)
                .await
                .map_err(backend)?;
            IncrementResult::LimitReached(to_count(count)?)
        };

        tx.commit().await.map_err(backend)?;
        Ok(result)
    }

    async fn daily_actions(
        &self,
        user: &Username,
        day: NaiveDate,
    ) -> Result<DailyActions, StateError> {
        let daily = self.config.daily_actions_table();

        let mut tx = self.pool.begin().await.map_err(backend)?;
        self.ensure_record(&mut tx, user, day).await?;

        let select = format!(
            "SELECT aqi_checks, forecast_checks, carbon_calculations FROM {daily} \
             WHERE username = $1 AND day = $2"
        );
        let (aqi, forecast, carbon): (i32, i32, i32) = sqlx::query_as(&select)
            .bind(user.as_str())
            .bind(day)
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;

        Ok(DailyActions {
            aqi_checks: to_count(aqi)?,
            forecast_checks: to_count(forecast)?,
            carbon_calculations: to_count(carbon)?,
        })
    }

    async fn add_points(&self, user: &Username, delta: i64) -> Result<i64, StateError> {
        let users = self.config.users_table();
        let upsert = format!(
            "INSERT INTO {users} AS u (username, points) VALUES ($1, GREATEST($2::BIGINT, 0)) \
             ON CONFLICT (username) DO UPDATE SET points = GREATEST(u.points + $2::BIGINT, 0) \
             RETURNING points"
        );
        let (points,): (i64,) = sqlx::query_as(&upsert)
            .bind(user.as_str())
            .bind(delta)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(points)
    }

    async fn points(&self, user: &Username) -> Result<i64, StateError> {
        self.ensure_user(user).await?;

        let users = self.config.users_table();
        let select = format!("SELECT points FROM {users} WHERE username = $1");
        let (points,): (i64,) = sqlx::query_as(&select)
            .bind(user.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(points)
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StateError> {
        let users = self.config.users_table();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let select = format!(
            "SELECT username, points FROM {users} \
             ORDER BY points DESC, username COLLATE \"C\" ASC LIMIT $1"
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&select)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter()
            .map(|(name, points)| {
                let username = Username::parse(&name)
                    .map_err(|e| StateError::Serialization(format!("{e}: {name:?}")))?;
                Ok(LeaderboardEntry { username, points })
            })
            .collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use ecoquest_state::testing::{run_concurrency_tests, run_store_conformance_tests};

    use super::*;

    fn test_config() -> PostgresConfig {
        PostgresConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/ecoquest_test".to_string()),
            table_prefix: format!("test_{}_", uuid::Uuid::new_v4().simple()),
            ..PostgresConfig::default()
        }
    }

    #[tokio::test]
    async fn store_conformance() {
        let store = PostgresCounterStore::new(test_config())
            .await
            .expect("pool creation should succeed");
        run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_admission() {
        let config = PostgresConfig {
            pool_size: 16,
            ..test_config()
        };
        let store: Arc<dyn CounterStore> = Arc::new(
            PostgresCounterStore::new(config)
                .await
                .expect("pool creation should succeed"),
        );
        run_concurrency_tests(store)
            .await
            .expect("concurrency tests should pass");
    }
}
