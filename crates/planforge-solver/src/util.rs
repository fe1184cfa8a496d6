//! Numeric helpers shared by graph and summary building.

use std::collections::BTreeMap;

use serde::Serializer;
use serde::ser::SerializeMap;

use crate::config::PRECISION_DIGITS;

/// Round a display value to the configured precision.
pub fn round_to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(PRECISION_DIGITS);
    (value * factor).round() / factor
}

/// Round to one decimal, for percentage fields.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serialize a float as `null` when it is NaN or infinite, so no
/// unrepresentable value ever leaves the core.
pub fn clean_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

/// Map-valued variant of [`clean_f64`].
pub fn clean_f64_map<S: Serializer>(
    map: &BTreeMap<String, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        if value.is_finite() {
            out.serialize_entry(key, value)?;
        } else {
            out.serialize_entry(key, &Option::<f64>::None)?;
        }
    }
    out.end()
}
