//! Great-circle distance on a spherical Earth.

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinate pairs, in meters.
///
/// Symmetric, total for any finite input, and zero when both points coincide.
/// No ellipsoidal correction; the spherical approximation is accurate enough
/// for radius checks at crisis-zone scale.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero_distance() {
        assert_eq!(haversine_distance(63.4305, 10.3951, 63.4305, 10.3951), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let forward = haversine_distance(63.4305, 10.3951, 59.9139, 10.7522);
        let backward = haversine_distance(59.9139, 10.7522, 63.4305, 10.3951);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_one_hundredth_degree_of_latitude() {
        // Along a meridian the haversine reduces to an arc of the mean-radius
        // sphere: 6371000 * 0.01 * pi / 180 = 1111.949 m.
        let d = haversine_distance(63.43, 10.40, 63.44, 10.40);
        assert!((d - 1111.949).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_equatorial_longitude_step_matches_meridian_step() {
        // At the equator a degree of longitude spans the same arc as a degree
        // of latitude.
        let lon_step = haversine_distance(0.0, 10.0, 0.0, 10.01);
        let lat_step = haversine_distance(10.0, 0.0, 10.01, 0.0);
        assert!((lon_step - lat_step).abs() < 0.001, "{lon_step} vs {lat_step}");
    }

    #[test]
    fn test_realistic_city_pair() {
        // Trondheim center to Oslo center, roughly 392 km.
        let d = haversine_distance(63.4305, 10.3951, 59.9139, 10.7522);
        assert!((390_000.0..395_000.0).contains(&d), "got {d}");
    }
}
