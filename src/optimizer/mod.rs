//! optimizer — the pluggable-optimizer contract and its variants.
//!
//! Purpose
//! -------
//! Define the capability every optimizer must implement ([`Optimizer`],
//! driving a [`LossEval`]) and provide the built-in variants: a naive
//! fixed-step gradient descent and a quasi-Newton method backed by
//! argmin's L-BFGS. The argmin-facing pieces ([`adapter`], [`builders`])
//! are public so user code can wrap further third-party solvers into the
//! same contract.
//!
//! Key behaviors
//! -------------
//! - Every variant is interchangeable wherever an optimizer instance is
//!   required; the Driver never inspects concrete types.
//! - Each variant owns its entire iterative loop — step sizes, line
//!   searches, stopping criteria — and records the per-iteration loss into
//!   the Driver's trace.
//! - Contract validation happens in `check()`, reported by the Driver as
//!   `UnsupportedOptimizer` before any evaluation runs.
//!
//! Downstream usage
//! ----------------
//! - The Driver (`crate::driver`) merges options, instruments the session,
//!   and invokes `optimize`.
//! - User-defined optimizers implement [`Optimizer`] directly; the stub
//!   optimizers in the integration tests show the minimal shape.

pub mod adapter;
pub mod builders;
pub mod gradient_descent;
pub mod quasi_newton;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::gradient_descent::GradientDescent;
pub use self::quasi_newton::QuasiNewton;
pub use self::traits::{LineSearcher, LossEval, Optimizer};
