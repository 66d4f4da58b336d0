//! Churchill friction factor and loss coefficients.
//!
//! The Churchill correlation covers laminar, transitional and turbulent flow
//! with a single expression, which keeps the branch pressure change smooth in
//! mass flow rate.

use crate::common::check_finite;
use crate::error::{CorrelationError, CorrelationResult};

fn churchill_inner_term(reynolds: f64, roughness_ratio: f64) -> f64 {
    let laminar = (8.0 / reynolds).powf(12.0);

    let log_fraction = 1.0 / ((7.0 / reynolds).powf(0.9) + 0.27 * roughness_ratio);
    let a = (2.457 * log_fraction.ln()).powf(16.0);
    let b = (37530.0 / reynolds).powf(16.0);

    let turbulent = (1.0 / (a + b)).powf(1.5);
    laminar + turbulent
}

/// Fanning friction factor from the Churchill correlation.
pub fn fanning(reynolds: f64, roughness_ratio: f64) -> CorrelationResult<f64> {
    if !(reynolds > 0.0) {
        return Err(CorrelationError::InvalidArg {
            what: "reynolds number must be positive",
        });
    }
    if roughness_ratio < 0.0 {
        return Err(CorrelationError::InvalidArg {
            what: "roughness ratio must be non-negative",
        });
    }

    let f = 2.0 * churchill_inner_term(reynolds, roughness_ratio).powf(1.0 / 12.0);
    check_finite(f, "fanning friction factor")
}

/// Darcy friction factor (4 × Fanning).
pub fn darcy(reynolds: f64, roughness_ratio: f64) -> CorrelationResult<f64> {
    Ok(4.0 * fanning(reynolds, roughness_ratio)?)
}

/// Total loss coefficient `f L/D + K`.
pub fn fldk(
    reynolds: f64,
    roughness_ratio: f64,
    length_to_diameter: f64,
    form_loss_k: f64,
) -> CorrelationResult<f64> {
    if length_to_diameter <= 0.0 {
        return Err(CorrelationError::InvalidArg {
            what: "length to diameter ratio must be positive",
        });
    }
    if form_loss_k < 0.0 {
        return Err(CorrelationError::InvalidArg {
            what: "form loss K must be non-negative",
        });
    }
    Ok(darcy(reynolds, roughness_ratio)? * length_to_diameter + form_loss_k)
}
