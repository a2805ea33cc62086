//! options — optimizer configuration with Driver precedence.
//!
//! Purpose
//! -------
//! Represent per-run optimizer configuration as a small set of
//! strongly-typed reserved fields (iteration budget, convergence
//! tolerances, verbosity, strictness) plus a string-keyed side map for
//! optimizer-specific extras. The Driver merges its own overrides over an
//! optimizer instance's defaults with explicit precedence rules, so the
//! bridge's bookkeeping can never be silently disabled by an instance
//! default.
//!
//! Key behaviors
//! -------------
//! - Validate numeric fields on construction: tolerances must be finite and
//!   strictly positive, the iteration budget strictly positive.
//! - Merge two option sets with Driver precedence: reserved fields come
//!   from the override when present, the instance otherwise; extras pass
//!   through with override entries winning on key collision.
//! - In strict mode, reject extras whose key shadows a reserved name with
//!   [`BridgeError::OptionConflict`] instead of silently preferring the
//!   typed field.
//!
//! Conventions
//! -----------
//! - Reserved keys are exactly [`RESERVED_KEYS`]; everything else in
//!   `extras` is opaque to the Driver and reaches the optimizer unchanged.
//! - `merged` validates the combined result, so optimizers can assume any
//!   `OptimOptions` they receive is internally consistent.
use std::collections::HashMap;

use crate::{
    errors::{BridgeError, BridgeResult},
    validation::{verify_tol_grad, verify_tol_loss},
};

/// Option keys the Driver owns. Extras shadowing one of these are either
/// ignored (default) or rejected (`strict`), never forwarded.
pub const RESERVED_KEYS: [&str; 4] = ["max_iter", "tol_grad", "tol_loss", "verbose"];

/// Dynamically-typed value for optimizer-specific extra options.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Float(f64),
    Int(i64),
    Text(String),
    Flag(bool),
}

/// Per-run optimizer configuration.
///
/// Fields:
/// - `max_iter` — iteration budget; the optimizer records at most this many
///   history entries.
/// - `tol_grad` — terminate when the gradient norm falls below this value.
/// - `tol_loss` — terminate when the change in loss falls below this value.
/// - `verbose` — if `true`, runners attach a progress observer (behind the
///   `obs_slog` feature) and log the initial state.
/// - `strict` — enable reserved-key conflict detection during merge.
/// - `extras` — optimizer-specific options, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimOptions {
    pub max_iter: Option<usize>,
    pub tol_grad: Option<f64>,
    pub tol_loss: Option<f64>,
    pub verbose: bool,
    pub strict: bool,
    pub extras: HashMap<String, OptionValue>,
}

impl OptimOptions {
    /// Construct validated options.
    ///
    /// # Rules
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`BridgeError::InvalidTolGrad`] / [`BridgeError::InvalidTolLoss`]
    ///   for non-finite or non-positive tolerances.
    /// - [`BridgeError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        max_iter: Option<usize>, tol_grad: Option<f64>, tol_loss: Option<f64>,
    ) -> BridgeResult<Self> {
        verify_tol_grad(tol_grad)?;
        verify_tol_loss(tol_loss)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(BridgeError::InvalidMaxIter {
                    max_iter,
                    reason: "Iteration budget must be greater than zero.",
                });
            }
        }
        Ok(Self { max_iter, tol_grad, tol_loss, ..Self::default() })
    }

    /// Builder-style setter for an extra, optimizer-specific option.
    pub fn with_extra(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Builder-style setter for strict reserved-key checking.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder-style setter for verbose progress reporting.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Merge Driver-level `overrides` over an instance's options.
    ///
    /// Reserved fields are taken from `overrides` when present and from
    /// `instance` otherwise; `verbose` and `strict` are ORed so either side
    /// can enable them. Extras are unioned with `overrides` winning on key
    /// collision. The merged result is re-validated.
    ///
    /// # Errors
    /// - Any validation error from [`OptimOptions::new`] on the merged
    ///   reserved fields.
    /// - [`BridgeError::OptionConflict`] in strict mode when an extras key
    ///   shadows a reserved name.
    pub fn merged(instance: &OptimOptions, overrides: &OptimOptions) -> BridgeResult<OptimOptions> {
        let mut merged = OptimOptions::new(
            overrides.max_iter.or(instance.max_iter),
            overrides.tol_grad.or(instance.tol_grad),
            overrides.tol_loss.or(instance.tol_loss),
        )?;
        merged.verbose = overrides.verbose || instance.verbose;
        merged.strict = overrides.strict || instance.strict;

        for (key, value) in instance.extras.iter().chain(overrides.extras.iter()) {
            merged.extras.insert(key.clone(), value.clone());
        }
        if merged.strict {
            if let Some(key) = merged.extras.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
                return Err(BridgeError::OptionConflict {
                    key: key.clone(),
                    reason: "Reserved option keys must be set through their typed fields.",
                });
            }
        }
        Ok(merged)
    }
}
