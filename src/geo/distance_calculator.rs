use crate::error::ApiError;
use crate::geo::{DistanceUnit, GeoPoint};
use crate::validation::{is_latitude, is_longitude};

/// Earth radius used to turn miles into an angular radius
pub const EARTH_RADIUS_MI: f64 = 3963.2;
/// Earth radius used to turn kilometres into an angular radius
pub const EARTH_RADIUS_KM: f64 = 6378.1;
/// Sphere radius for distances in metres (same sphere as `EARTH_RADIUS_KM`)
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

pub const METERS_TO_MILES: f64 = 0.000621371;
pub const METERS_TO_KILOMETERS: f64 = 0.001;

const LAT_LNG_FORMAT_HINT: &str = "Please provide latitude and longitude in the format lat,lng";

/// Parses a `"lat,lng"` path parameter into a point
///
/// Whitespace around each component is ignored, as are components after the
/// second. Either component missing, non-numeric or out of range is a bad
/// request.
pub fn parse_lat_lng(raw: &str) -> Result<GeoPoint, ApiError> {
    let mut parts = raw.split(',').map(str::trim);

    let lat = parts.next().filter(|s| !s.is_empty());
    let lng = parts.next().filter(|s| !s.is_empty());

    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ApiError::bad_request(LAT_LNG_FORMAT_HINT));
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| ApiError::bad_request(LAT_LNG_FORMAT_HINT))?;
    let lng: f64 = lng
        .parse()
        .map_err(|_| ApiError::bad_request(LAT_LNG_FORMAT_HINT))?;

    if !is_latitude(lat) || !is_longitude(lng) {
        return Err(ApiError::bad_request(
            "Latitude must be within [-90, 90] and longitude within [-180, 180]",
        ));
    }

    Ok(GeoPoint::new(lng, lat))
}

/// Converts a radius in the given unit to radians on the unit sphere
pub fn radius_in_radians(distance: f64, unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Miles => distance / EARTH_RADIUS_MI,
        DistanceUnit::Kilometers => distance / EARTH_RADIUS_KM,
    }
}

/// Factor turning metres into the requested unit
pub fn distance_multiplier(unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Miles => METERS_TO_MILES,
        DistanceUnit::Kilometers => METERS_TO_KILOMETERS,
    }
}

/// Great-circle angle between two points in radians (haversine)
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * h.sqrt().min(1.0).asin()
}

/// Straight-line distance along the sphere in metres
pub fn distance_in_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    angular_distance(a, b) * EARTH_RADIUS_M
}

/// Inclusive containment test used by radius queries
pub fn within_sphere(center: GeoPoint, point: GeoPoint, radius_radians: f64) -> bool {
    angular_distance(center, point) <= radius_radians
}

/// SQL expression for the haversine angle between a row's point and a bound point
///
/// `$lng_param`/`$lat_param` are positional parameter indexes for the query
/// point; the column names belong to the caller's table.
pub fn angular_distance_sql(lng_column: &str, lat_column: &str, lng_param: u8, lat_param: u8) -> String {
    format!(
        "2 * ASIN(LEAST(1.0, SQRT(\
            POWER(SIN(RADIANS({lat_column} - ${lat_param}) / 2), 2) + \
            COS(RADIANS(${lat_param})) * COS(RADIANS({lat_column})) * \
            POWER(SIN(RADIANS({lng_column} - ${lng_param}) / 2), 2))))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_parse_lat_lng_returns_lng_lat_point() {
        let point = parse_lat_lng("34.05,-118.25").unwrap();
        assert_eq!(point.lng, -118.25);
        assert_eq!(point.lat, 34.05);
    }

    #[test]
    fn test_parse_lat_lng_tolerates_whitespace() {
        let point = parse_lat_lng(" 5.1 , -1.2 ").unwrap();
        assert_eq!(point, GeoPoint::new(-1.2, 5.1));
    }

    #[test]
    fn test_parse_lat_lng_rejects_missing_component() {
        for raw in ["34.05", "34.05,", ",-118.25", "", ","] {
            let err = parse_lat_lng(raw).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest { .. }), "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_lat_lng_rejects_non_numeric() {
        for raw in ["abc,-118.25", "34.05,west", "north,south"] {
            assert!(matches!(parse_lat_lng(raw), Err(ApiError::BadRequest { .. })));
        }
    }

    #[test]
    fn test_parse_lat_lng_rejects_out_of_range() {
        assert!(parse_lat_lng("-118.25,34.05").is_err());
        assert!(parse_lat_lng("10,200").is_err());
    }

    #[test]
    fn test_radius_in_radians() {
        let radius = radius_in_radians(100.0, DistanceUnit::Miles);
        assert!(approx(radius, 0.02523, 1e-5));
        assert_eq!(radius, 100.0 / 3963.2);

        assert_eq!(radius_in_radians(6378.1, DistanceUnit::Kilometers), 1.0);
    }

    #[test]
    fn test_distance_multiplier() {
        assert_eq!(distance_multiplier(DistanceUnit::Miles), 0.000621371);
        assert_eq!(distance_multiplier(DistanceUnit::Kilometers), 0.001);
    }

    #[test]
    fn test_angular_distance_zero_for_same_point() {
        let p = GeoPoint::new(-118.25, 34.05);
        assert_eq!(angular_distance(p, p), 0.0);
        assert!(within_sphere(p, p, 0.0));
    }

    #[test]
    fn test_distance_along_equator() {
        let origin = GeoPoint::new(0.0, 0.0);
        let lng = (1000.0 / EARTH_RADIUS_M).to_degrees();
        let d = distance_in_meters(origin, GeoPoint::new(lng, 0.0));
        assert!(approx(d, 1000.0, 1e-6));
    }

    #[test]
    fn test_known_city_distance() {
        // Accra to Kumasi is roughly 200 km
        let accra = GeoPoint::new(-0.1870, 5.6037);
        let kumasi = GeoPoint::new(-1.6244, 6.6885);
        let km = distance_in_meters(accra, kumasi) * METERS_TO_KILOMETERS;
        assert!(km > 190.0 && km < 210.0, "got {}", km);
    }

    #[test]
    fn test_within_sphere_excludes_point_beyond_radius() {
        let center = GeoPoint::new(0.0, 0.0);
        let radius = radius_in_radians(10.0, DistanceUnit::Kilometers);
        let inside = GeoPoint::new((9_000.0 / EARTH_RADIUS_M).to_degrees(), 0.0);
        let outside = GeoPoint::new((11_000.0 / EARTH_RADIUS_M).to_degrees(), 0.0);

        assert!(within_sphere(center, inside, radius));
        assert!(!within_sphere(center, outside, radius));
    }

    #[test]
    fn test_angular_distance_sql_binds_params() {
        let sql = angular_distance_sql("location_lng", "location_lat", 1, 2);
        assert!(sql.contains("RADIANS(location_lng - $1)"));
        assert!(sql.contains("RADIANS(location_lat - $2)"));
        assert!(sql.contains("COS(RADIANS($2))"));
    }

    proptest! {
        #[test]
        fn prop_angular_distance_is_symmetric(
            lng1 in -180.0f64..180.0, lat1 in -90.0f64..90.0,
            lng2 in -180.0f64..180.0, lat2 in -90.0f64..90.0
        ) {
            let a = GeoPoint::new(lng1, lat1);
            let b = GeoPoint::new(lng2, lat2);
            prop_assert!((angular_distance(a, b) - angular_distance(b, a)).abs() < 1e-9);
        }

        #[test]
        fn prop_angular_distance_bounded_by_pi(
            lng1 in -180.0f64..180.0, lat1 in -90.0f64..90.0,
            lng2 in -180.0f64..180.0, lat2 in -90.0f64..90.0
        ) {
            let d = angular_distance(GeoPoint::new(lng1, lat1), GeoPoint::new(lng2, lat2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI + 1e-9);
        }
    }
}
