use serde::{Deserialize, Serialize};

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Suggested average travel speed for ETA estimates.
pub const DEFAULT_AVG_SPEED_KMH: f64 = 50.0;

/// Great-circle distance in kilometres. Either endpoint being unknown yields
/// `f64::INFINITY`, which callers must treat as "unknown": it is usable in
/// threshold comparisons but never as a distance to do arithmetic on.
pub fn haversine_km(from: Option<GeoPoint>, to: Option<GeoPoint>) -> f64 {
    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => return f64::INFINITY,
    };

    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Minutes until arrival at the workplace, rounded up. Returns `None` when
/// the distance is zero or unknown, or the speed is not positive.
pub fn estimate_eta_minutes(
    current: Option<GeoPoint>,
    workplace: Option<GeoPoint>,
    avg_speed_kmh: f64,
) -> Option<u32> {
    let distance_km = haversine_km(current, workplace);
    if distance_km <= 0.0 || !distance_km.is_finite() || avg_speed_kmh <= 0.0 {
        return None;
    }

    Some((distance_km / avg_speed_kmh * 60.0).ceil() as u32)
}
