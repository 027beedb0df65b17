//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on reasonable UX limits for names, comments
//! and descriptions; SurrealDB schemaless fields have no built-in
//! length enforcement.

use crate::money::MAX_PRICE;
use shared::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product names, user display names
pub const MAX_NAME_LEN: usize = 200;

/// Review comments (overall and per-product)
pub const MAX_COMMENT_LEN: usize = 1000;

/// Short identifiers: color, size, category, material
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Ratings live on a 1..=5 scale, fractional values allowed.
pub fn validate_rating(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || !(1.0..=5.0).contains(&value) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be between 1 and 5"),
        ));
    }
    Ok(())
}

/// Ratings that may be omitted (delivery / service)
pub fn validate_optional_rating(value: Option<f64>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) => validate_rating(v, field),
        None => Ok(()),
    }
}

/// Purchase and cart quantities must be positive.
pub fn validate_quantity(value: i64, field: &str) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("{field} must be at least 1"),
        ));
    }
    Ok(())
}

/// Prices must be finite, strictly positive and below [`MAX_PRICE`].
/// money::to_f64 的 SAFETY 论证依赖这里的上界。
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("{field} must be a positive amount"),
        ));
    }
    if value > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("{field} must not exceed {MAX_PRICE}"),
        ));
    }
    Ok(())
}
