//! Great-circle distance on a spherical Earth.

/// Mean Earth radius (IUGG) in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance in meters between two `(lat, lng)` positions in degrees.
pub fn distance_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1.0 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Returns whether `to` lies within `radius_m` meters of `from`, inclusive.
pub fn is_within(from: (f64, f64), to: (f64, f64), radius_m: f64) -> bool {
    distance_m(from, to) <= radius_m
}
