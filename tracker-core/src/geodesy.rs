//! Great-circle distance on a spherical Earth.
//!
//! Used by the position validator's speed and range gates, which need a
//! cheap, good-enough distance between two lat/lon fixes — not a geodesic
//! solver.

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two lat/lon points, in meters.
///
/// Degrees in, meters out. Uses the haversine formula for points closer than
/// ~0.001 rad (about 100m) in both latitude and longitude, where haversine's
/// conditioning is best; otherwise falls back to the spherical law of
/// cosines, which is cheaper and accurate enough once squared small-angle
/// terms stop mattering. Either branch is within the ~0.5% error budget of
/// the spherical-Earth approximation itself.
pub fn great_circle_m(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let lat0_r = lat0.to_radians();
    let lat1_r = lat1.to_radians();
    let dlat = lat1_r - lat0_r;
    let dlon = (lon1 - lon0).to_radians();

    if dlat.abs() < 0.001 && dlon.abs() < 0.001 {
        let a = (dlat / 2.0).sin().powi(2)
            + lat0_r.cos() * lat1_r.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_M * c
    } else {
        let cos_central = lat0_r.sin() * lat1_r.sin() + lat0_r.cos() * lat1_r.cos() * dlon.cos();
        EARTH_RADIUS_M * cos_central.clamp(-1.0, 1.0).acos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(great_circle_m(51.5, -0.1, 51.5, -0.1), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_equator_is_about_111_km() {
        let d = great_circle_m(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km_anywhere() {
        let d = great_circle_m(45.0, 10.0, 46.0, 10.0);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = great_circle_m(34.0, -118.0, 40.0, -74.0);
        let ba = great_circle_m(40.0, -74.0, 34.0, -118.0);
        assert_eq!(ab, ba);
    }

    #[test]
    fn antipodal_points_are_about_half_earth_circumference() {
        let d = great_circle_m(0.0, 0.0, 0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - expected).abs() < 1.0, "got {d}");
    }

    #[test]
    fn known_city_pair_is_roughly_right() {
        // London to Paris, ~344 km great-circle.
        let d = great_circle_m(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 344_000.0).abs() < 5_000.0, "got {d}");
    }
}
