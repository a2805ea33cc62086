//! Validation helpers shared across the bridge.
//!
//! This module centralizes common consistency checks used by the session,
//! the options layer, and the optimizer runners:
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_loss`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Loss values**: [`validate_loss`] checks scalar evaluations for
//!   finiteness.
//! - **Final parameters**: [`validate_solution`] ensures a run's final
//!   vector exists and contains only finite values.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`BridgeError`] variants, making higher-level code more uniform and
//! easier to debug.
use crate::{
    errors::{BridgeError, BridgeResult},
    types::{Grad, Loss, ParamVec},
};

/// Validate the optional gradient-norm tolerance.
///
/// - Accepts `None` (no stopping rule on gradient).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`BridgeError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> BridgeResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(BridgeError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(BridgeError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional loss-change tolerance (for convergence).
///
/// - Accepts `None` (no stopping rule on loss change).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`BridgeError::InvalidTolLoss`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_loss(tol: Option<f64>) -> BridgeResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(BridgeError::InvalidTolLoss { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(BridgeError::InvalidTolLoss { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`BridgeError::GradientDimMismatch`] if length does not match `dim`.
/// - [`BridgeError::NonFiniteGradient`] with the index/value/reason of the
///   first offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> BridgeResult<()> {
    if grad.len() != dim {
        return Err(BridgeError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(BridgeError::NonFiniteGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate that a scalar loss value is finite.
///
/// Negative values are fine as long as they are finite.
///
/// # Errors
/// Returns [`BridgeError::NonFiniteLoss`] if the value is `NaN` or infinite.
pub fn validate_loss(value: Loss) -> BridgeResult<()> {
    if !value.is_finite() {
        return Err(BridgeError::NonFiniteLoss { value });
    }
    Ok(())
}

/// Validate and unwrap a run's final parameter vector.
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Returns
/// The owned `ParamVec` if valid.
///
/// # Errors
/// - [`BridgeError::MissingSolution`] if no vector was provided.
/// - [`BridgeError::InvalidSolution`] if any element is non-finite.
pub fn validate_solution(solution: Option<ParamVec>) -> BridgeResult<ParamVec> {
    match solution {
        Some(x) => {
            for (index, &value) in x.iter().enumerate() {
                if !value.is_finite() {
                    return Err(BridgeError::InvalidSolution {
                        index,
                        value,
                        reason: "Final parameters must be finite.",
                    });
                }
            }
            Ok(x)
        }
        None => Err(BridgeError::MissingSolution),
    }
}
