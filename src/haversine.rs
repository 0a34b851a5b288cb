//! Great-circle distance between coordinate pairs.
//!
//! Used to derive edge lengths when building a graph from raw map data,
//! where segment geometry is only available as node coordinates.

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two (lat, lon) points in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let dist = haversine_m((51.5025, -0.1508), (51.5025, -0.1508));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_known_distance() {
        // Wellington Arch to Marble Arch, roughly 1.5 km.
        let dist = haversine_m((51.5025, -0.1508), (51.5131, -0.1589));
        assert!(
            dist > 1_200.0 && dist < 1_500.0,
            "expected ~1.3km, got {dist}"
        );
    }

    #[test]
    fn test_symmetric() {
        let a = (51.5025, -0.1508);
        let b = (51.5131, -0.1589);
        assert_eq!(haversine_m(a, b), haversine_m(b, a));
    }
}
