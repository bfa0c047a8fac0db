//! Field constraints applied when raw records are normalized.
//!
//! The bounds live here, next to the data model, so every consumer (the
//! parser's normalizer, the store's order glue) clamps identically.

use thiserror::Error;

/// Lower star-rating bound. The source data also circulated with a stricter
/// [1, 5] variant; this crate standardizes on the wider bound so an explicit
/// zero rating survives normalization.
pub const STARS_MIN: f64 = 0.0;
/// Upper star-rating bound.
pub const STARS_MAX: f64 = 5.0;

/// Bounds for percent-like character attributes (affinity, excitement).
pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

/// Plausible resting-to-peak heart-rate bounds for service stats.
pub const HEART_RATE_MIN: f64 = 60.0;
pub const HEART_RATE_MAX: f64 = 200.0;

/// Reasons an individual record is rejected during normalization. One
/// rejected record never aborts its batch; the error is logged and the
/// entity is dropped.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("package in shop {shop_id} has no usable name")]
    MissingPackageName { shop_id: String },

    #[error("malformed record: {reason}")]
    Malformed { reason: String },
}

/// Clamps `value` into `[min, max]`. Non-finite values collapse to `min`
/// (a NaN rating or attribute is treated as absent data, not an error).
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

/// Clamps a star rating to the schema bounds.
#[must_use]
pub fn clamp_stars(value: f64) -> f64 {
    clamp(value, STARS_MIN, STARS_MAX)
}

/// Clamps a percent-like attribute to `[0, 100]`.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    clamp(value, PERCENT_MIN, PERCENT_MAX)
}

/// Clamps a heart-rate reading to `[60, 200]`.
#[must_use]
pub fn clamp_heart_rate(value: f64) -> f64 {
    clamp(value, HEART_RATE_MIN, HEART_RATE_MAX)
}
