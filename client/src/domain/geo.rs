//! Great-circle distance between coordinates.

use shared::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    // Rounding can push `a` just past 1 for antipodal points
    let a = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2)).clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn haversine_meters(from: Coordinates, to: Coordinates) -> f64 {
    haversine_km(from, to) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let point = Coordinates::new(1.35, 103.87);
        assert_eq!(haversine_km(point, point), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Toronto to Montreal, roughly 504 km
        let toronto = Coordinates::new(43.6532, -79.3832);
        let montreal = Coordinates::new(45.5017, -73.5673);
        let distance = haversine_km(toronto, montreal);
        assert!((distance - 504.0).abs() < 5.0, "got {}", distance);
    }

    #[test]
    fn test_antipodal_points_are_half_the_circumference() {
        let pairs = [
            (Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0)),
            (Coordinates::new(90.0, 0.0), Coordinates::new(-90.0, 0.0)),
            (Coordinates::new(1.35, 103.87), Coordinates::new(-1.35, -76.13)),
        ];
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        for (from, to) in pairs {
            let distance = haversine_km(from, to);
            assert!(distance.is_finite(), "{:?} -> {:?} gave {}", from, to, distance);
            assert!((distance - half).abs() < 1.0, "got {}", distance);
        }
    }

    #[test]
    fn test_is_symmetric() {
        let a = Coordinates::new(1.35, 103.87);
        let b = Coordinates::new(1.37, 103.88);
        assert!((haversine_meters(a, b) - haversine_meters(b, a)).abs() < 1e-6);
    }
}
