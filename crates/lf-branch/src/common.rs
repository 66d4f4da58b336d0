//! Common utilities for correlation calculations.

use crate::error::{CorrelationError, CorrelationResult};
use lf_core::numeric::ensure_finite;

/// Flows below this magnitude carry no friction loss (kg/s).
pub const EPSILON_MDOT: f64 = 1e-12;

/// Ensure a value is finite, returning CorrelationError if not.
pub fn check_finite(value: f64, what: &'static str) -> CorrelationResult<f64> {
    ensure_finite(value, what).map_err(|_| CorrelationError::NonPhysical { what })
}

/// Ensure `value` lies in `[min, max]`.
pub fn check_range(value: f64, min: f64, max: f64, what: &'static str) -> CorrelationResult<f64> {
    check_finite(value, what)?;
    if value < min || value > max {
        return Err(CorrelationError::OutOfRange {
            what,
            value,
            min,
            max,
        });
    }
    Ok(value)
}
