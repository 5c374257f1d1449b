//! Great-circle distance on a spherical Earth.
//!
//! Ground distance between a query point and a sample is approximated by the
//! haversine formula on a sphere of mean Earth radius.

/// Mean Earth radius in meters (IUGG mean radius, rounded).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS84 points given in decimal
/// degrees.
///
/// The intermediate term is clamped to [0, 1] so antipodal points cannot
/// produce a NaN from floating-point drift.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
