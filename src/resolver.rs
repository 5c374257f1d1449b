//! Nearest-Sample Resolver
//!
//! The one piece of real logic in this service: validate a query, scan the
//! preloaded dataset for the closest sample by great-circle distance, and
//! reject matches outside the requested radius.
//!
//! The resolver is a pure function over the static dataset and the query; it
//! has no side effects and identical queries always return identical results.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::SoilDataset;
use crate::geo;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;
const MIN_SEARCH_RADIUS_KM: f64 = 0.1;
const MAX_SEARCH_RADIUS_KM: f64 = 1000.0;

/// A degree of latitude spans roughly 111 km everywhere on the sphere; used
/// to turn the search radius into a conservative latitude band.
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// A single soil carbon lookup request.
#[derive(Debug, Clone, Deserialize)]
pub struct SoilCarbonQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance_km: f64,
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE_KM
}

/// The matched sample plus the computed distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleMatch {
    pub carbon_pct: f64,
    pub sample_id: String,
    pub distance_meters: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    /// Input outside the declared ranges; reported before any dataset access.
    #[error("{0}")]
    Validation(String),

    /// No sample within the requested radius.
    #[error("No Data in {radius_km} km radius")]
    NotFound { radius_km: f64 },
}

impl SoilCarbonQuery {
    /// Range checks on all three inputs. NaN fails every range check, so
    /// non-finite values are rejected here as well.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ResolveError::Validation(
                "Latitude must be between -90 and 90 degrees".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ResolveError::Validation(
                "Longitude must be between -180 and 180 degrees".to_string(),
            ));
        }
        if !(MIN_SEARCH_RADIUS_KM..=MAX_SEARCH_RADIUS_KM).contains(&self.max_distance_km) {
            return Err(ResolveError::Validation(format!(
                "Maximum search distance must be between {} and {} km",
                MIN_SEARCH_RADIUS_KM, MAX_SEARCH_RADIUS_KM
            )));
        }
        Ok(())
    }
}

/// Find the nearest sample to the query point within the search radius.
///
/// Candidates are first narrowed to a latitude band around the query (the
/// band over-approximates the radius, so no true match is lost), then ranked
/// by exact haversine distance. Equidistant samples tie-break on the lowest
/// snapshot row index; the (distance, index) key is a total order, so the
/// parallel scan is deterministic.
pub fn resolve(dataset: &SoilDataset, query: &SoilCarbonQuery) -> Result<SampleMatch, ResolveError> {
    query.validate()?;

    let band_deg = query.max_distance_km / KM_PER_DEGREE_LAT;
    let band_lo = query.latitude - band_deg;
    let band_hi = query.latitude + band_deg;
    let max_meters = query.max_distance_km * 1000.0;

    let nearest = dataset
        .samples()
        .par_iter()
        .enumerate()
        .filter(|(_, sample)| sample.latitude >= band_lo && sample.latitude <= band_hi)
        .map(|(idx, sample)| {
            let distance = geo::haversine_m(
                query.latitude,
                query.longitude,
                sample.latitude,
                sample.longitude,
            );
            (distance, idx, sample)
        })
        .filter(|(distance, _, _)| *distance <= max_meters)
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    match nearest {
        Some((distance_meters, _, sample)) => Ok(SampleMatch {
            carbon_pct: sample.carbon_pct,
            sample_id: sample.sample_id.clone(),
            distance_meters,
            latitude: sample.latitude,
            longitude: sample.longitude,
        }),
        None => Err(ResolveError::NotFound {
            radius_km: query.max_distance_km,
        }),
    }
}
