use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;

use ecoquest_core::{ActionKind, Username};

use crate::error::StateError;
use crate::store::{CounterStore, IncrementResult};

fn user(name: &str) -> Username {
    Username::parse(name).expect("test usernames are non-empty")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid test date")
}

/// Run the full counter store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_store_conformance_tests(store: &dyn CounterStore) -> Result<(), StateError> {
    test_daily_actions_start_at_zero(store).await?;
    test_increment_until_limit(store).await?;
    test_kinds_are_independent(store).await?;
    test_new_day_resets_counters(store).await?;
    test_zero_limit_rejects(store).await?;
    test_points_create_user(store).await?;
    test_add_points(store).await?;
    test_points_floor_at_zero(store).await?;
    test_top_users_ordering(store).await?;
    test_concurrent_first_access(store).await?;
    Ok(())
}

async fn test_daily_actions_start_at_zero(store: &dyn CounterStore) -> Result<(), StateError> {
    let actions = store.daily_actions(&user("zero-user"), day(1)).await?;
    for kind in ActionKind::ALL {
        assert_eq!(actions.count(kind), 0, "{kind} should start at 0");
    }
    Ok(())
}

async fn test_increment_until_limit(store: &dyn CounterStore) -> Result<(), StateError> {
    let u = user("limit-user");
    for expected in 1..=3 {
        let result = store
            .increment_within_limit(&u, day(1), ActionKind::ForecastCheck, 3)
            .await?;
        assert_eq!(result, IncrementResult::Incremented(expected));
    }
    let result = store
        .increment_within_limit(&u, day(1), ActionKind::ForecastCheck, 3)
        .await?;
    assert_eq!(result, IncrementResult::LimitReached(3));

    let actions = store.daily_actions(&u, day(1)).await?;
    assert_eq!(
        actions.forecast_checks, 3,
        "a rejected attempt must not move the counter"
    );
    Ok(())
}

async fn test_kinds_are_independent(store: &dyn CounterStore) -> Result<(), StateError> {
    let u = user("kinds-user");
    store
        .increment_within_limit(&u, day(1), ActionKind::AqiCheck, 5)
        .await?;
    store
        .increment_within_limit(&u, day(1), ActionKind::AqiCheck, 5)
        .await?;
    store
        .increment_within_limit(&u, day(1), ActionKind::CarbonCalculation, 10)
        .await?;

    let actions = store.daily_actions(&u, day(1)).await?;
    assert_eq!(actions.aqi_checks, 2);
    assert_eq!(actions.forecast_checks, 0);
    assert_eq!(actions.carbon_calculations, 1);
    Ok(())
}

async fn test_new_day_resets_counters(store: &dyn CounterStore) -> Result<(), StateError> {
    let u = user("rollover-user");
    for _ in 0..2 {
        store
            .increment_within_limit(&u, day(1), ActionKind::AqiCheck, 2)
            .await?;
    }
    let blocked = store
        .increment_within_limit(&u, day(1), ActionKind::AqiCheck, 2)
        .await?;
    assert_eq!(blocked, IncrementResult::LimitReached(2));

    let next = store
        .increment_within_limit(&u, day(2), ActionKind::AqiCheck, 2)
        .await?;
    assert_eq!(next, IncrementResult::Incremented(1));

    let previous = store.daily_actions(&u, day(1)).await?;
    assert_eq!(previous.aqi_checks, 2, "past day record is untouched");
    Ok(())
}

async fn test_zero_limit_rejects(store: &dyn CounterStore) -> Result<(), StateError> {
    let result = store
        .increment_within_limit(&user("zero-limit"), day(1), ActionKind::AqiCheck, 0)
        .await?;
    assert_eq!(result, IncrementResult::LimitReached(0));
    Ok(())
}

async fn test_points_create_user(store: &dyn CounterStore) -> Result<(), StateError> {
    let u = user("fresh-points");
    assert_eq!(store.points(&u).await?, 0);
    assert_eq!(store.points(&u).await?, 0);
    Ok(())
}

async fn test_add_points(store: &dyn CounterStore) -> Result<(), StateError> {
    let u = user("points-user");
    assert_eq!(store.add_points(&u, 10).await?, 10);
    assert_eq!(store.add_points(&u, 15).await?, 25);
    assert_eq!(store.add_points(&u, -5).await?, 20);
    assert_eq!(store.points(&u).await?, 20);
    Ok(())
}

async fn test_points_floor_at_zero(store: &dyn CounterStore) -> Result<(), StateError> {
    let existing = user("floor-user");
    store.add_points(&existing, 5).await?;
    assert_eq!(store.add_points(&existing, -8).await?, 0);
    assert_eq!(store.points(&existing).await?, 0);
    assert_eq!(store.add_points(&existing, 4).await?, 4);

    let fresh = user("floor-fresh");
    assert_eq!(store.add_points(&fresh, -50).await?, 0);
    assert_eq!(store.points(&fresh).await?, 0);
    Ok(())
}

async fn test_top_users_ordering(store: &dyn CounterStore) -> Result<(), StateError> {
    // Large balances keep these rows above anything earlier tests created.
    store.add_points(&user("lb-a"), 1_000_030).await?;
    store.add_points(&user("lb-b"), 1_000_050).await?;
    store.add_points(&user("lb-c"), 1_000_010).await?;
    store.add_points(&user("lb-d"), 1_000_030).await?;

    let top = store.top_users(4).await?;
    let names: Vec<&str> = top.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["lb-b", "lb-a", "lb-d", "lb-c"]);
    assert_eq!(top[0].points, 1_000_050);

    let top_one = store.top_users(1).await?;
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].username.as_str(), "lb-b");

    assert!(store.top_users(0).await?.is_empty());
    Ok(())
}

async fn test_concurrent_first_access(store: &dyn CounterStore) -> Result<(), StateError> {
    // Every caller races to create the same (user, day) record.
    let u = user("first-access");
    let results = join_all(
        (0..8).map(|_| store.increment_within_limit(&u, day(9), ActionKind::CarbonCalculation, 10)),
    )
    .await;

    let mut counts = Vec::new();
    for result in results {
        match result? {
            IncrementResult::Incremented(n) => counts.push(n),
            IncrementResult::LimitReached(n) => panic!("unexpected rejection at {n}"),
        }
    }
    counts.sort_unstable();
    assert_eq!(counts, (1..=8).collect::<Vec<_>>());
    Ok(())
}

/// Fire `limit + 5` simultaneous increments from separate tasks and check
/// that exactly `limit` are admitted.
///
/// Must be driven from a multi-threaded runtime to exercise real contention.
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_concurrency_tests(store: Arc<dyn CounterStore>) -> Result<(), StateError> {
    for kind in ActionKind::ALL {
        let limit = 5;
        let u = user(&format!("race-{kind}"));
        let handles: Vec<_> = (0..limit + 5)
            .map(|_| {
                let store = Arc::clone(&store);
                let u = u.clone();
                tokio::spawn(async move {
                    store.increment_within_limit(&u, day(15), kind, limit).await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut rejected = 0;
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| StateError::Backend(format!("task panicked: {e}")))?;
            match result? {
                IncrementResult::Incremented(_) => admitted += 1,
                IncrementResult::LimitReached(n) => {
                    assert_eq!(n, limit, "rejection must report the full counter");
                    rejected += 1;
                }
            }
        }
        assert_eq!(admitted, limit, "exactly `limit` admitted for {kind}");
        assert_eq!(rejected, 5);

        let actions = store.daily_actions(&u, day(15)).await?;
        assert_eq!(actions.count(kind), limit);
    }
    Ok(())
}
