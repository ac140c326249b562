//! Internal helpers for payload validation and id conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Unwrap a mandatory payload field.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> ResultEngine<T> {
    value.ok_or_else(|| EngineError::Validation(format!("missing mandatory parameter: {field}")))
}

/// Unwrap and trim a mandatory text field; blank counts as missing.
pub(crate) fn required_text(value: Option<&str>, field: &str) -> ResultEngine<String> {
    normalize_optional_text(value)
        .ok_or_else(|| EngineError::Validation(format!("missing mandatory parameter: {field}")))
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn validate_liters(liters: f64) -> ResultEngine<f64> {
    if !liters.is_finite() || liters <= 0.0 {
        return Err(EngineError::Validation("liters must be > 0".to_string()));
    }
    Ok(liters)
}

pub(crate) fn validate_odometer(odometer: i64, field: &str) -> ResultEngine<i64> {
    if odometer < 0 {
        return Err(EngineError::Validation(format!("{field} must be >= 0")));
    }
    Ok(odometer)
}
