use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating required tables if they do not exist.
///
/// Creates the users table and the per-day action counters table in the
/// configured schema with the configured table prefix.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let users_table = config.users_table();
    let daily_table = config.daily_actions_table();

    let create_users = format!(
        "CREATE TABLE IF NOT EXISTS {users_table} (
            username TEXT PRIMARY KEY,
            points BIGINT NOT NULL DEFAULT 0
        )"
    );

    let create_daily = format!(
        "CREATE TABLE IF NOT EXISTS {daily_table} (
            username TEXT NOT NULL REFERENCES {users_table} (username),
            day DATE NOT NULL,
            aqi_checks INTEGER NOT NULL DEFAULT 0,
            forecast_checks INTEGER NOT NULL DEFAULT 0,
            carbon_calculations INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (username, day)
        )"
    );

    sqlx::query(&create_users).execute(pool).await?;
    sqlx::query(&create_daily).execute(pool).await?;

    Ok(())
}
