// Validation utilities module
// Custom validators for domain rules plus slug derivation

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Validates a GeoJSON `[lng, lat]` coordinate pair
pub fn validate_coordinates(coordinates: &[f64]) -> Result<(), ValidationError> {
    match coordinates {
        [lng, lat] if is_longitude(*lng) && is_latitude(*lat) => Ok(()),
        [_, _] => Err(ValidationError::new("coordinates_out_of_range")),
        _ => Err(ValidationError::new("coordinates_must_be_lng_lat_pair")),
    }
}

/// Validates that a GeoJSON geometry type is "Point"
pub fn validate_point_type(kind: &str) -> Result<(), ValidationError> {
    if kind == "Point" {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_geometry_type"))
    }
}

/// Validates that a required text field is not only whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

pub fn is_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

pub fn is_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

/// Derives a URL slug from a display name
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-` and trims leading/trailing dashes.
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"));

    let lowered = name.to_lowercase();
    re.replace_all(&lowered, "-").trim_matches('-').to_string()
}
