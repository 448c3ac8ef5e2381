use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use chrono::NaiveDate;
use tower::ServiceExt;

use ecoquest_core::{FixedClock, ProviderOutcome};
use ecoquest_gateway::GatewayBuilder;
use ecoquest_provider::{
    Activity, AirQualityReport, AirQualitySource, CarbonEstimate, CarbonEstimator, Coordinates,
    ForecastSource, LocationQuery, Pollutants, SimulatedForecast,
};
use ecoquest_server::api::AppState;
use ecoquest_state_memory::MemoryCounterStore;

// -- Mock providers -------------------------------------------------------

struct MockAirQuality {
    calls: AtomicUsize,
}

#[async_trait]
impl AirQualitySource for MockAirQuality {
    async fn air_quality(&self, query: &LocationQuery) -> ProviderOutcome<AirQualityReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProviderOutcome::success(
            AirQualityReport {
                requested_city: query.city.clone(),
                nearest_station_city: query.city.clone(),
                state: "Maharashtra".into(),
                country: query.country.clone(),
                aqi_us: 152,
                main_pollutant: "p2".into(),
                pollutants: Pollutants::from([("pm2_5".to_owned(), 55.0)]),
                coordinates: Coordinates {
                    lat: 19.07,
                    lon: 72.87,
                },
                temperature: 30.0,
                humidity: 70.0,
                wind_speed: 4.1,
            },
            "mock",
        )
    }
}

struct MockCarbon {
    fail: bool,
}

#[async_trait]
impl CarbonEstimator for MockCarbon {
    async fn estimate(&self, activity: Activity, value: f64) -> ProviderOutcome<CarbonEstimate> {
        if self.fail {
            return ProviderOutcome::failure("Failed to fetch carbon data: climatiq HTTP 500");
        }
        ProviderOutcome::success(
            CarbonEstimate {
                activity,
                value,
                unit: activity.unit().into(),
                kg_co2: 1.71,
            },
            "mock",
        )
    }
}

// -- Helpers --------------------------------------------------------------

struct TestApp {
    app: axum::Router,
    air_calls: Arc<MockAirQuality>,
}

fn build_app(carbon_fails: bool) -> TestApp {
    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
    ));
    let air = Arc::new(MockAirQuality {
        calls: AtomicUsize::new(0),
    });
    let forecast: Arc<dyn ForecastSource> = Arc::new(SimulatedForecast::new(clock.clone()));

    let gateway = GatewayBuilder::new()
        .store(Arc::new(MemoryCounterStore::new()))
        .clock(clock)
        .air_quality(air.clone())
        .forecast(forecast)
        .carbon(Arc::new(MockCarbon { fail: carbon_fails }))
        .provider_timeout(Duration::from_secs(5))
        .build()
        .expect("gateway should build");

    let state = AppState {
        gateway: Arc::new(gateway),
    };
    TestApp {
        app: ecoquest_server::api::router(state),
        air_calls: air,
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn root_and_health() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("EcoQuest API"));

    let (status, body) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["requested"], 0);
}

#[tokio::test]
async fn air_quality_awards_points_then_hits_limit() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/air_quality?city=Mumbai&username=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_earned"], 10);
    assert_eq!(body["total_points"], 10);
    assert_eq!(body["remaining_checks"], 4);
    assert_eq!(body["requested_city"], "Mumbai");
    assert_eq!(body["data_source"], "live");

    for _ in 0..4 {
        let (status, _) = get(&t.app, "/air_quality?city=Mumbai&username=alice").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&t.app, "/air_quality?city=Mumbai&username=alice").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "daily limit reached for aqi_checks");
    assert_eq!(body["action"], "aqi_checks");
    assert_eq!(body["limit"], 5);
    assert!(body.get("points_earned").is_none());

    // The rejected call never reached the provider.
    assert_eq!(t.air_calls.calls.load(Ordering::SeqCst), 5);

    let (_, user) = get(&t.app, "/user/alice").await;
    assert_eq!(user["points"], 50);
    assert_eq!(user["daily_actions"]["aqi_checks"], 5);
}

#[tokio::test]
async fn carbon_failure_consumes_quota_without_points() {
    let t = build_app(true);

    let (status, body) = get(&t.app, "/carbon?activity=car&value=10&username=bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Failed to fetch carbon data: climatiq HTTP 500");
    assert_eq!(body["remaining_checks"], 9);
    assert!(body.get("points_earned").is_none());

    let (_, user) = get(&t.app, "/user/bob").await;
    assert_eq!(user["points"], 0);
    assert_eq!(user["daily_actions"]["carbon_calculations"], 1);
}

#[tokio::test]
async fn carbon_success_payload() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/carbon?activity=train&value=120&username=cara").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activity"], "train");
    assert_eq!(body["unit"], "km");
    assert_eq!(body["kgCO2"], 1.71);
    assert_eq!(body["points_earned"], 15);
    assert_eq!(body["remaining_checks"], 9);
}

#[tokio::test]
async fn unsupported_activity_is_rejected_before_the_gate() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/carbon?activity=rocket&value=10&username=dan").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Unsupported activity. Choose from [car, bus, train, flight, electricity]"
    );

    let (_, user) = get(&t.app, "/user/dan").await;
    assert_eq!(user["daily_actions"]["carbon_calculations"], 0);
}

#[tokio::test]
async fn missing_username_is_400() {
    let t = build_app(false);

    for uri in [
        "/air_quality?city=Mumbai",
        "/forecast?city=Delhi",
        "/carbon?activity=car&value=3",
        "/air_quality?city=Mumbai&username=%20%20",
    ] {
        let (status, body) = get(&t.app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "username is required");
    }
    assert_eq!(t.air_calls.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_query_values_get_json_errors() {
    let t = build_app(false);

    for uri in [
        "/carbon?activity=car&value=lots&username=erin",
        "/forecast?days=three&username=erin",
        "/leaderboard?limit=-1",
        "/update_points?username=erin&delta=ten",
    ] {
        let request = if uri.starts_with("/update_points") {
            Request::builder()
                .method(http::Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        } else {
            Request::builder().uri(uri).body(Body::empty()).unwrap()
        };
        let (status, body) = send(&t.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let message = body["error"].as_str().unwrap_or_default();
        assert!(
            message.starts_with("Failed to deserialize query string"),
            "{uri}: {body}"
        );
    }

    let (_, user) = get(&t.app, "/user/erin").await;
    assert_eq!(user["daily_actions"]["carbon_calculations"], 0);
    assert_eq!(user["daily_actions"]["forecast_checks"], 0);
    assert_eq!(user["points"], 0);
}

#[tokio::test]
async fn forecast_is_simulated_and_clamped() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/forecast?city=Delhi&country=India&days=30&username=eve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Delhi");
    assert_eq!(body["forecast_type"], "simulated");
    assert_eq!(body["days"].as_array().unwrap().len(), 7);
    assert_eq!(body["days"][0]["date"], "2025-05-11");
    assert_eq!(body["points_earned"], 5);
    assert_eq!(body["remaining_checks"], 2);
    assert_eq!(body["data_source"], "fallback");
}

#[tokio::test]
async fn new_user_summary_has_zeroes_and_limits() {
    let t = build_app(false);

    let (status, body) = get(&t.app, "/user/newbie").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "newbie");
    assert_eq!(body["points"], 0);
    assert_eq!(body["daily_actions"]["forecast_checks"], 0);
    assert_eq!(body["daily_limits"]["aqi_checks"], 5);
    assert_eq!(body["daily_limits"]["forecast_checks"], 3);
    assert_eq!(body["daily_limits"]["carbon_calculations"], 10);
}

#[tokio::test]
async fn update_points_accepts_json_and_query() {
    let t = build_app(false);

    let (status, body) = post_json(
        &t.app,
        "/update_points",
        &serde_json::json!({"username": "fred", "delta": 25}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"username": "fred", "points": 25}));

    let (status, body) = send(
        &t.app,
        Request::builder()
            .method(http::Method::POST)
            .uri("/update_points?username=fred&delta=-40")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 0);

    let (status, body) = post_json(
        &t.app,
        "/update_points",
        &serde_json::json!({"username": "fred"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "delta is required");
}

#[tokio::test]
async fn leaderboard_orders_by_points() {
    let t = build_app(false);

    for (user, delta) in [("a", 30), ("b", 50), ("c", 10)] {
        post_json(
            &t.app,
            "/update_points",
            &serde_json::json!({"username": user, "delta": delta}),
        )
        .await;
    }

    let (status, body) = get(&t.app, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
    assert_eq!(body[0]["points"], 50);

    let (_, body) = get(&t.app, "/leaderboard?limit=1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn metrics_reflect_actions() {
    let t = build_app(true);

    get(&t.app, "/air_quality?username=gia").await;
    get(&t.app, "/carbon?username=gia").await;

    let (status, body) = get(&t.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested"], 2);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["points_awarded"], 10);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let t = build_app(false);
    let (status, body) = get(&t.app, "/api-doc/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "EcoQuest API");
    assert!(body["paths"].get("/air_quality").is_some());
}
