//! types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used across the
//! bridge. By defining these in one place, the rest of the crate can stay
//! agnostic to `ndarray` and Argmin generics and can more easily evolve if
//! the backend changes.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients, and scalar
//!   losses (`ParamVec`, `Grad`, `Loss`).
//! - Expose pre-wired L-BFGS solver aliases for the supported line-search
//!   strategies, using the common `(ParamVec, Grad, Loss)` numeric shapes.
//! - Pin the Argmin iteration-state shape used by the quasi-Newton runner
//!   and its trace observer (`BridgeIterState`).
//!
//! Invariants & assumptions
//! ------------------------
//! - All bridge vectors are represented as `ndarray` containers over `f64`.
//! - `Loss` is always a scalar `f64`; optimizers minimize it directly, so no
//!   sign flip happens anywhere in this crate.
//! - The line-search aliases assume Argmin's three-parameter forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
//!
//! Conventions
//! -----------
//! - `ParamVec` and `Grad` are treated conceptually as column vectors with
//!   length equal to the graph's trainable-parameter count.
//! - `DEFAULT_LBFGS_MEM` encodes the typical history size for L-BFGS;
//!   callers may override it per optimizer instance.
//! - `DEFAULT_MAX_ITER` is the Driver-level iteration budget applied when
//!   neither the caller nor the optimizer instance provides one.
//! - This module defines no runtime behavior beyond what `ndarray` and
//!   Argmin require when these types are instantiated elsewhere.
//!
//! Downstream usage
//! ----------------
//! - Other modules import these aliases instead of referring directly to
//!   `ndarray` or Argmin generics.
//! - Solver construction in `optimizer::builders` uses the provided solver
//!   aliases (e.g., [`LbfgsHagerZhang`]) based on a chosen line search.
use argmin::{
    core::IterState,
    solver::{
        linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
        quasinewton::LBFGS,
    },
};
use ndarray::Array1;

/// Flat parameter vector marshaled between the graph and an optimizer.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the bridge.
pub type ParamVec = Array1<f64>;

/// Gradient of the loss with respect to a [`ParamVec`].
///
/// Alias for `ndarray::Array1<f64>`, matching the shape of `ParamVec`.
pub type Grad = Array1<f64>;

/// Scalar objective value produced by one graph forward pass.
pub type Loss = f64;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Driver-level iteration budget used when no other budget is supplied.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<ParamVec, Grad, Loss>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<ParamVec, Grad, Loss>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, ParamVec, Grad, Loss>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, ParamVec, Grad, Loss>;

/// Argmin iteration state used by the quasi-Newton runner and observers.
pub type BridgeIterState = IterState<ParamVec, Grad, (), (), (), f64>;
