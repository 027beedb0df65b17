//! Money calculation utilities using rust_decimal for precision
//!
//! Order totals are computed using `Decimal` internally, then converted
//! back to `f64` for storage/serialization.

use crate::db::models::OrderLine;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per product (1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated at the boundary.
/// If NaN/Infinity somehow reaches here, logs an error and returns ZERO
/// to avoid silent data corruption in order totals.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp with max input ≤ 1_000_000 (validated at boundary)
        // is always within f64 representable range (~1.8e308)
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Line total = snapshotted unit price × quantity
#[inline]
pub fn line_total(price: f64, quantity: i64) -> Decimal {
    to_decimal(price) * Decimal::from(quantity)
}

/// Order total over all snapshotted lines, rounded to 2 decimal places
pub fn order_total(lines: &[OrderLine]) -> f64 {
    let sum: Decimal = lines
        .iter()
        .map(|line| line_total(line.price, line.quantity))
        .sum();
    to_f64(sum)
}
