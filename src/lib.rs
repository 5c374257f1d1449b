//! Soil Carbon API
//!
//! Nearest-sample lookup over a snapshot of the Open Soil Spectral Library
//! (OSSL). Given a latitude/longitude and a search radius, the service
//! returns the closest soil organic carbon measurement and its great-circle
//! distance from the query point.
//!
//! - `data`: snapshot ingestion with Polars (Parquet/CSV)
//! - `geo`: haversine distance
//! - `resolver`: query validation and nearest-neighbor scan
//! - `api_server`: axum routes and error mapping

pub mod api_server;
pub mod data;
pub mod geo;
pub mod resolver;

// Re-export commonly used types
pub use api_server::{create_router, AppState, SoilCarbonResponse};
pub use data::{Sample, SoilDataset};
pub use resolver::{resolve, ResolveError, SampleMatch, SoilCarbonQuery};
