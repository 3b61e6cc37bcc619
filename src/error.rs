//! Error types shared by the pricing, implied-volatility and simulation modules.
//!
//! Input validation failures are fatal to a single call and surface as
//! [`PricingError`]. Numerically expected "no solution" outcomes (an implied
//! volatility that does not exist, a calibration that did not converge) are
//! reported through typed results instead, see [`crate::models::iv::ImpliedVol`]
//! and [`crate::calibration::types::CalibrationResult`].

use thiserror::Error;

/// Errors raised by the pricing engine for invalid inputs or configuration.
///
/// # Examples
/// ```
/// use pricing_lib::PricingError;
///
/// let err = PricingError::InvalidInput { field: "spot", value: -1.0 };
/// assert!(err.to_string().contains("spot"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// A numeric input was non-positive, non-finite or otherwise out of its domain.
    #[error("Invalid input: {field} = {value}")]
    InvalidInput {
        /// Name of the offending input
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A configuration value was inconsistent (empty bracket, zero paths, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results carrying a [`PricingError`].
pub type PricingResultOf<T> = std::result::Result<T, PricingError>;

/// Ensure `value` is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> PricingResultOf<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PricingError::InvalidInput { field, value })
    }
}

/// Ensure `value` is finite.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> PricingResultOf<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::InvalidInput { field, value })
    }
}
