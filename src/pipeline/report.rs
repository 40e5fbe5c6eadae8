//! The success payload.

use serde::{Serialize, Serializer};

/// Temperature of one place in three units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    #[serde(rename = "temp_C", serialize_with = "compact_float")]
    pub temp_c: f64,
    #[serde(rename = "temp_F", serialize_with = "compact_float")]
    pub temp_f: f64,
    #[serde(rename = "temp_K", serialize_with = "compact_float")]
    pub temp_k: f64,
}

impl WeatherReport {
    /// Derive the report from a Celsius reading: `F = C * 1.8 + 32`, `K = C + 273`.
    pub fn from_celsius(city: impl Into<String>, temp_c: f64) -> Self {
        Self {
            city: city.into(),
            temp_c,
            temp_f: temp_c * 1.8 + 32.0,
            temp_k: temp_c + 273.0,
        }
    }
}

/// Largest magnitude at which every integer is exactly representable in an f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Write integral values without a fractional part (`18` rather than `18.0`),
/// which is what existing clients of this endpoint receive.
fn compact_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
