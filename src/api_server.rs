//! Axum API Server Module
//!
//! HTTP surface over the nearest-sample resolver. Three routes: a welcome
//! payload, a health check, and the soil carbon lookup itself. The dataset is
//! loaded once at startup and shared read-only across handlers, so no locking
//! is needed.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::data::SoilDataset;
use crate::resolver::{self, ResolveError, SampleMatch, SoilCarbonQuery};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<SoilDataset>,
}

impl AppState {
    /// Load the OSSL snapshot and build the shared state. A load failure is
    /// fatal; the server must not start without its dataset.
    pub fn new(data_path: &str) -> anyhow::Result<Self> {
        tracing::info!("Loading OSSL snapshot from {}...", data_path);
        let dataset = SoilDataset::load(data_path)?;
        tracing::info!("Dataset ready ({} samples)", dataset.len());
        Ok(Self::from_dataset(dataset))
    }

    /// Wrap an already-loaded dataset (used by tests).
    pub fn from_dataset(dataset: SoilDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/soil_carbon", post(get_soil_carbon))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

/// Response envelope for `POST /soil_carbon`. `data` is serialized as `null`
/// when no sample matched; callers key off `success`.
#[derive(Debug, Serialize)]
pub struct SoilCarbonResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<SampleMatch>,
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Soil Carbon API",
        "description": "Query soil organic carbon data from OSSL dataset",
        "endpoints": {
            "GET /": "This welcome message",
            "GET /health": "Health check endpoint",
            "POST /soil_carbon": "Query soil carbon data by coordinates",
        }
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "API is running",
        "service": "soil-carbon-api",
    }))
}

async fn get_soil_carbon(
    State(state): State<AppState>,
    Json(query): Json<SoilCarbonQuery>,
) -> Result<Json<SoilCarbonResponse>, AppError> {
    tracing::debug!(
        "Lookup at ({}, {}) within {} km",
        query.latitude,
        query.longitude,
        query.max_distance_km
    );

    // CPU-bound scan over the dataset: run in the blocking thread pool
    let dataset = state.dataset.clone();
    let result = tokio::task::spawn_blocking(move || resolver::resolve(&dataset, &query))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

    match result {
        Ok(found) => Ok(Json(SoilCarbonResponse {
            success: true,
            message: "Soil carbon data found successfully".to_string(),
            data: Some(found),
        })),
        // An empty radius is a normal outcome for the caller, not an error
        Err(not_found @ ResolveError::NotFound { .. }) => Ok(Json(SoilCarbonResponse {
            success: false,
            message: not_found.to_string(),
            data: None,
        })),
        Err(ResolveError::Validation(message)) => Err(AppError::BadRequest(message)),
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
