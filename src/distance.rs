//! Great-circle distance between coordinate pairs.

/// Mean Earth radius in kilometers (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine great-circle distance in kilometers between two lat/lon pairs
/// given in degrees.
///
/// Pure and deterministic. Identical points return exactly `0.0`. The
/// haversine form is numerically stable for nearby points; the asin argument
/// is clamped so antipodal rounding cannot produce a NaN.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin()
}
