// API Integration Tests
//
// Purpose: Exercise all endpoints against an in-memory dataset
// Run with: cargo test --test api_integration_tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use soil_carbon_api::{create_router, AppState, Sample, SoilDataset};
use tower::ServiceExt; // for oneshot

// Helper: Build the app over a small fixed dataset
fn create_test_app() -> axum::Router {
    let samples = vec![
        Sample {
            sample_id: "ossl-boston".to_string(),
            latitude: 42.3650,
            longitude: -71.0550,
            carbon_pct: 2.5,
        },
        Sample {
            sample_id: "ossl-sf".to_string(),
            latitude: 37.7849,
            longitude: -122.4094,
            carbon_pct: 4.1,
        },
    ];
    let state = AppState::from_dataset(SoilDataset::from_samples(samples));
    create_router(state)
}

// Helper: Parse JSON response
async fn json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Failed to parse JSON")
}

// Helper: POST a JSON body to /soil_carbon
async fn post_soil_carbon(app: axum::Router, body: Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/soil_carbon")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// =========================================================================
// Section 1: Welcome + Health
// =========================================================================

#[tokio::test]
async fn test_root_welcome_payload() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["message"], "Welcome to the Soil Carbon API");
    assert_eq!(
        body["description"],
        "Query soil organic carbon data from OSSL dataset"
    );
    assert!(body["endpoints"]["POST /soil_carbon"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "soil-carbon-api");
}

// =========================================================================
// Section 2: Soil Carbon Lookup - Success Path
// =========================================================================

#[tokio::test]
async fn test_soil_carbon_found() {
    let app = create_test_app();

    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 42.3601,
            "longitude": -71.0589,
            "max_distance_km": 10.0
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Soil carbon data found successfully");

    let data = &body["data"];
    assert_eq!(data["sample_id"], "ossl-boston");
    assert_eq!(data["carbon_pct"], 2.5);
    assert_eq!(data["latitude"], 42.3650);
    assert_eq!(data["longitude"], -71.0550);

    // Haversine distance for this pair is ~632.1 m, well inside the radius
    let distance = data["distance_meters"].as_f64().unwrap();
    assert!((distance - 632.09).abs() < 0.5, "distance was {}", distance);
    assert!(distance <= 10.0 * 1000.0);
}

#[tokio::test]
async fn test_soil_carbon_default_radius() {
    let app = create_test_app();

    // max_distance_km omitted: defaults to 10 km, sample is ~1.4 km away
    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 37.7749,
            "longitude": -122.4194
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["sample_id"], "ossl-sf");

    let distance = body["data"]["distance_meters"].as_f64().unwrap();
    assert!(
        (distance - 1417.33).abs() < 0.5,
        "distance was {}",
        distance
    );
}

#[tokio::test]
async fn test_soil_carbon_idempotent() {
    let app = create_test_app();
    let request = serde_json::json!({
        "latitude": 42.3601,
        "longitude": -71.0589,
        "max_distance_km": 10.0
    });

    let first = json_response(post_soil_carbon(app.clone(), request.clone()).await).await;
    let second = json_response(post_soil_carbon(app, request).await).await;

    assert_eq!(first, second);
}

// =========================================================================
// Section 3: Soil Carbon Lookup - No Data In Radius
// =========================================================================

#[tokio::test]
async fn test_soil_carbon_not_found_is_success_false() {
    let app = create_test_app();

    // Middle of the Atlantic: no sample anywhere near
    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 30.0,
            "longitude": -40.0,
            "max_distance_km": 50.0
        }),
    )
    .await;

    // Not an HTTP error: the caller gets success=false with a message
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    let message = body["message"].as_str().unwrap();
    assert!(
        message.starts_with("No Data in"),
        "unexpected message: {}",
        message
    );
}

#[tokio::test]
async fn test_soil_carbon_radius_too_small() {
    let app = create_test_app();

    // Nearest sample is ~632 m out; the minimum legal radius must miss it
    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 42.3601,
            "longitude": -71.0589,
            "max_distance_km": 0.1
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
}

// =========================================================================
// Section 4: Soil Carbon Lookup - Validation Errors
// =========================================================================

#[tokio::test]
async fn test_latitude_out_of_range_is_400() {
    let app = create_test_app();

    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 91.0,
            "longitude": -71.0589,
            "max_distance_km": 10.0
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_response(response).await;
    assert_eq!(body["error"], "Latitude must be between -90 and 90 degrees");
}

#[tokio::test]
async fn test_longitude_out_of_range_is_400() {
    let app = create_test_app();

    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 42.0,
            "longitude": 200.0,
            "max_distance_km": 10.0
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_response(response).await;
    assert_eq!(
        body["error"],
        "Longitude must be between -180 and 180 degrees"
    );
}

#[tokio::test]
async fn test_zero_radius_is_400() {
    let app = create_test_app();

    let response = post_soil_carbon(
        app,
        serde_json::json!({
            "latitude": 42.0,
            "longitude": -71.0,
            "max_distance_km": 0.0
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_response(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(
        message.contains("Maximum search distance"),
        "unexpected message: {}",
        message
    );
}

#[tokio::test]
async fn test_missing_coordinates_is_rejected() {
    let app = create_test_app();

    // Body deserialization failure: axum rejects before the handler runs
    let response = post_soil_carbon(app, serde_json::json!({ "latitude": 42.0 })).await;

    assert!(response.status().is_client_error());
}
