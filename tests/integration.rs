use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use delivery_ops::api::rest::router;
use delivery_ops::geo::fallback::{CityTableStrategy, DefaultDistance};
use delivery_ops::geo::DistanceResolver;
use delivery_ops::models::records::{DeliveryRecord, DeliveryStatus, DispatchRecord, DriverProfile, ShiftRecord};
use delivery_ops::observability::metrics::Metrics;
use delivery_ops::pricing::engine::PricingEngine;
use delivery_ops::state::AppState;
use delivery_ops::store::memory::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const DRIVER_ID: &str = "6a1f9c3e-52b4-4d7e-9a0c-3f2e1d4c5b6a";
const PROFILE_ID: &str = "0b7e2d41-8c3a-4f5e-b6d9-1a2c3e4f5a6b";

fn setup() -> (axum::Router, Arc<MemoryStore>) {
    let metrics = Metrics::new();
    let resolver = DistanceResolver::new(
        vec![Arc::new(CityTableStrategy), Arc::new(DefaultDistance)],
        metrics.clone(),
    );
    let pricing = PricingEngine::new(resolver, metrics.clone());
    let store = Arc::new(MemoryStore::new());
    let stats = AppState::memory_aggregator(store.clone(), metrics.clone());

    (router(Arc::new(AppState::new(pricing, stats, metrics))), store)
}

fn seed_driver(store: &MemoryStore) {
    let driver_id = Uuid::parse_str(DRIVER_ID).unwrap();
    let profile_id = Uuid::parse_str(PROFILE_ID).unwrap();
    let two_days_ago = Utc::now() - Duration::days(2);

    store.insert_driver(DriverProfile {
        id: driver_id,
        profile_id: Some(profile_id),
        name: "Rosa Ortega".to_string(),
        is_active: true,
        is_on_duty: true,
    });

    for _ in 0..10 {
        store.insert_delivery(DeliveryRecord {
            id: Uuid::new_v4(),
            driver_id,
            status: DeliveryStatus::Completed,
            assigned_at: two_days_ago,
        });
    }
    for _ in 0..5 {
        store.insert_dispatch(DispatchRecord {
            id: Uuid::new_v4(),
            profile_id,
            request_status: DeliveryStatus::Completed,
            created_at: two_days_ago,
        });
    }
    store.insert_shift(ShiftRecord {
        id: Uuid::new_v4(),
        driver_id,
        shift_start: two_days_ago,
        shift_end: Some(two_days_ago + Duration::hours(5)),
        total_distance_miles: 42.0,
        gps_distance_miles: 40.0,
        delivery_count: 10,
        breaks: Vec::new(),
    });
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _store) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn same_city_quote_is_standard() {
    let (app, _store) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/calculate",
            json!({
                "pickupAddress": "1 Market St, San Francisco, CA 94105",
                "dropoffAddress": "SF",
                "headCount": 20,
                "foodCost": 250.0,
                "includeTip": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["deliveryPrice"], 35.0);
    assert_eq!(body["tier"], "Standard - Tier 1");
    assert_eq!(body["breakdown"]["tipIncluded"], true);
    assert_eq!(body["breakdown"]["distanceMiles"], 8.0);
    assert!(body["breakdown"]["calculation"]
        .as_str()
        .unwrap()
        .starts_with("Flat fee"));
}

#[tokio::test]
async fn cross_city_quote_uses_default_distance() {
    let (app, _store) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/calculate",
            json!({
                "pickupAddress": "1 Market St, San Francisco, CA",
                "dropoffAddress": "1 Broadway, Oakland, CA",
                "headCount": 20,
                "foodCost": 250.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["breakdown"]["distanceMiles"], 25.0);
    assert_eq!(body["deliveryPrice"], 71.59);
    assert_eq!(body["tier"], "Over 10 Miles - Tier 1");
    assert_eq!(body["breakdown"]["tipIncluded"], true);
}

#[tokio::test]
async fn quote_without_tip_costs_more() {
    let (app, _store) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/calculate",
            json!({
                "pickupAddress": "SF",
                "dropoffAddress": "san fran",
                "headCount": 20,
                "foodCost": 250.0,
                "includeTip": false
            }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["deliveryPrice"], 42.5);
    assert_eq!(body["breakdown"]["tipIncluded"], false);
}

#[tokio::test]
async fn quote_with_missing_fields_is_rejected() {
    let (app, _store) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/calculate",
            json!({ "pickupAddress": "SF" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn metrics_count_quotes() {
    let (app, _store) = setup();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/pricing/calculate",
            json!({
                "pickupAddress": "SF",
                "dropoffAddress": "SF",
                "headCount": 10,
                "foodCost": 100.0
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("pricing_quotes_total{band=\"standard\"} 1"));
    assert!(body.contains("distance_resolutions_total{strategy=\"city_table\"} 1"));
}

#[tokio::test]
async fn malformed_driver_id_returns_400() {
    let (app, store) = setup();
    let response = app
        .oneshot(get_request("/drivers/driver-42/stats?period=week"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid driver id"));
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn driver_without_record_reports_zeroes() {
    let (app, _store) = setup();
    let response = app
        .oneshot(get_request(&format!("/drivers/{DRIVER_ID}/stats")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["driver"]["id"], DRIVER_ID);
    assert_eq!(body["driver"]["name"], "Unknown Driver");
    assert_eq!(body["deliveries"]["total"], 0);
    assert_eq!(body["period"], "week");
}

#[tokio::test]
async fn unknown_period_returns_400() {
    let (app, _store) = setup();
    let response = app
        .oneshot(get_request(&format!(
            "/drivers/{DRIVER_ID}/stats?period=fortnight"
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weekly_driver_stats_merge_both_eras() {
    let (app, store) = setup();
    seed_driver(&store);

    let response = app
        .oneshot(get_request(&format!("/drivers/{DRIVER_ID}/stats?period=week")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["driver"]["name"], "Rosa Ortega");
    assert_eq!(body["period"], "week");
    assert_eq!(body["deliveries"]["total"], 15);
    assert_eq!(body["deliveries"]["completed"], 15);
    assert_eq!(body["distance"]["totalMiles"], 42.0);
    assert_eq!(body["distance"]["gpsVerifiedMiles"], 40.0);
    assert_eq!(body["shifts"]["totalShifts"], 1);
    assert_eq!(body["shifts"]["totalHours"], 5.0);
    assert_eq!(body["trends"]["deliveryChangePct"], 100);
    assert_eq!(body["trends"]["efficiencyRating"], 3.0);
    assert!(body.get("currentShift").is_none());
}

#[tokio::test]
async fn all_time_stats_have_no_trend() {
    let (app, store) = setup();
    seed_driver(&store);

    let response = app
        .oneshot(get_request(&format!("/drivers/{DRIVER_ID}/stats?period=all")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["deliveries"]["total"], 15);
    assert!(body.get("trends").is_none());
}

#[tokio::test]
async fn explicit_range_overrides_period() {
    let (app, store) = setup();
    seed_driver(&store);

    let start = (Utc::now() - Duration::days(1)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let response = app
        .oneshot(get_request(&format!(
            "/drivers/{DRIVER_ID}/stats?period=month&startDate={start}"
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["deliveries"]["total"], 0);
    assert!(body["trends"].is_object());
}

#[tokio::test]
async fn fleet_stats_summarize_active_drivers() {
    let (app, store) = setup();
    seed_driver(&store);
    store.insert_driver(DriverProfile {
        id: Uuid::new_v4(),
        profile_id: None,
        name: "Idle Ike".to_string(),
        is_active: false,
        is_on_duty: false,
    });

    let response = app
        .clone()
        .oneshot(get_request("/fleet/stats?period=week"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["totalDrivers"], 1);
    assert_eq!(body["activeDrivers"], 1);
    assert_eq!(body["onDutyDrivers"], 1);
    assert_eq!(body["totalDeliveries"], 15);
    assert_eq!(body["totalMiles"], 42.0);
    assert_eq!(body["topDrivers"][0]["name"], "Rosa Ortega");

    let response = app
        .oneshot(get_request("/fleet/stats?period=week&includeInactive=true"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["totalDrivers"], 2);
    assert_eq!(body["activeDrivers"], 1);
    assert_eq!(body["topDrivers"].as_array().unwrap().len(), 2);
}
