//! driver — orchestration of one full optimization run.
//!
//! Purpose
//! -------
//! Wire the codec and session into a concrete optimizer instance, inject
//! call counters and history capture, invoke the optimizer, and return the
//! recorded loss trajectory. This is the only place where the pieces of
//! the bridge meet; everything above it is the single-call public API in
//! [`crate::api`].
//!
//! Key behaviors
//! -------------
//! - Validate the optimizer instance first; a failing `check()` surfaces
//!   as [`BridgeError::UnsupportedOptimizer`] before any evaluation runs.
//! - Acquire the session's run guard, so overlapping runs against the same
//!   graph state fail with [`BridgeError::SessionBusy`] instead of
//!   corrupting it.
//! - Merge caller overrides over the instance's option defaults with
//!   Driver precedence — the iteration budget and convergence tolerances
//!   are always taken from the Driver-level call when supplied, never from
//!   the instance's own defaults; unrecognized extras pass through.
//! - Wrap the session in an instrumented evaluator that counts loss and
//!   gradient calls, and hand the optimizer a fresh [`LossTrace`] for
//!   history capture, decoupled from optimizer-internal bookkeeping.
//! - On success, write the final accepted vector back into graph storage
//!   and truncate the captured history to the merged budget; an optimizer
//!   that converges early yields a shorter history, never a padded one.
//!
//! Failure semantics
//! -----------------
//! Any error raised inside loss or gradient evaluation — a shape mismatch,
//! a non-finite value — propagates unchanged to the caller. The Driver
//! performs no retry and no suppression, and no partial history is
//! returned on failure.
use std::cell::Cell;

use crate::{
    errors::{BridgeError, BridgeResult},
    graph::Graph,
    history::{LossHistory, LossTrace},
    optimizer::traits::{LossEval, Optimizer},
    options::OptimOptions,
    session::EvalSession,
    types::{DEFAULT_MAX_ITER, Grad, Loss, ParamVec},
};

/// Outcome of one Driver-level run.
///
/// - `history`: per-iteration loss trajectory, truncated to the merged
///   iteration budget.
/// - `final_params`: the optimizer's final accepted vector (also written
///   back into the graph before this report is returned).
/// - `loss_evals` / `grad_evals`: bridge-level evaluation counts recorded
///   by the Driver's instrumentation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub history: LossHistory,
    pub final_params: ParamVec,
    pub loss_evals: u64,
    pub grad_evals: u64,
}

/// Evaluator wrapper that counts calls on behalf of the Driver.
///
/// Counter state lives in `Cell`s so the wrapper stays usable through the
/// shared references the optimizer contract requires.
#[derive(Debug)]
pub struct InstrumentedEval<'s, E: LossEval> {
    inner: &'s E,
    loss_calls: Cell<u64>,
    grad_calls: Cell<u64>,
}

impl<'s, E: LossEval> InstrumentedEval<'s, E> {
    pub fn new(inner: &'s E) -> Self {
        Self { inner, loss_calls: Cell::new(0), grad_calls: Cell::new(0) }
    }

    pub fn loss_calls(&self) -> u64 {
        self.loss_calls.get()
    }

    pub fn grad_calls(&self) -> u64 {
        self.grad_calls.get()
    }
}

impl<E: LossEval> LossEval for InstrumentedEval<'_, E> {
    fn loss(&self, params: &ParamVec) -> BridgeResult<Loss> {
        self.loss_calls.set(self.loss_calls.get() + 1);
        self.inner.loss(params)
    }

    fn grad(&self, out: &mut Grad, params: &ParamVec) -> BridgeResult<()> {
        self.grad_calls.set(self.grad_calls.get() + 1);
        self.inner.grad(out, params)
    }
}

/// Run one full optimization against a session.
///
/// Steps, in order: contract check, run-guard acquisition, option merge
/// with Driver precedence, flatten of the session's current parameters,
/// instrumentation, optimizer invocation, write-back of the final vector,
/// budget truncation of the captured history.
///
/// # Errors
/// - [`BridgeError::UnsupportedOptimizer`] if the instance fails its
///   contract check.
/// - [`BridgeError::SessionBusy`] if the session already has an active run.
/// - [`BridgeError::OptionConflict`] and option-validation errors from the
///   merge.
/// - Any evaluation error, unchanged.
pub fn run<G: Graph, O: Optimizer>(
    session: &EvalSession<G>, optimizer: &mut O, overrides: &OptimOptions,
) -> BridgeResult<RunReport> {
    if let Err(reason) = optimizer.check() {
        return Err(BridgeError::UnsupportedOptimizer {
            name: optimizer.name().to_string(),
            reason: reason.to_string(),
        });
    }
    let _guard = session.begin_run()?;

    let mut opts = OptimOptions::merged(optimizer.options(), overrides)?;
    let budget = opts.max_iter.unwrap_or(DEFAULT_MAX_ITER);
    opts.max_iter = Some(budget);

    let init = session.flatten_params()?;
    let trace = LossTrace::new();
    let eval = InstrumentedEval::new(session);

    let final_params = optimizer.optimize(&eval, init, &opts, &trace)?;

    session.write_params(&final_params)?;
    let history = trace.snapshot_truncated(budget);
    Ok(RunReport {
        history,
        final_params,
        loss_evals: eval.loss_calls(),
        grad_evals: eval.grad_calls(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayView1, ArrayViewMut1, array};

    use crate::optimizer::gradient_descent::GradientDescent;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - UnsupportedOptimizer mapping of failed contract checks.
    // - Instrumentation counters on a short run.
    // - Write-back of the final vector into graph storage.
    //
    // They intentionally DO NOT cover:
    // - Full convergence properties and history semantics (integration
    //   tests).
    // -------------------------------------------------------------------------

    struct QuadGraph {
        params: Array1<f64>,
    }

    impl Graph for QuadGraph {
        fn param_count(&self) -> usize {
            self.params.len()
        }

        fn read_params(&self, mut out: ArrayViewMut1<'_, f64>) {
            out.assign(&self.params);
        }

        fn write_params(&mut self, params: ArrayView1<'_, f64>) {
            self.params.assign(&params);
        }

        fn forward(&mut self) -> BridgeResult<Loss> {
            Ok(self.params.iter().map(|x| (x - 3.0) * (x - 3.0)).sum())
        }

        fn backward(&mut self, mut out: ArrayViewMut1<'_, f64>) -> BridgeResult<()> {
            for (slot, &x) in out.iter_mut().zip(self.params.iter()) {
                *slot = 2.0 * (x - 3.0);
            }
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that an instance failing its contract check is reported as
    // `UnsupportedOptimizer` carrying the instance name, before any
    // evaluation happens.
    fn failed_contract_check_maps_to_unsupported_optimizer() {
        // Arrange
        let session = EvalSession::new(QuadGraph { params: array![0.0] });
        let mut bad = GradientDescent::new(-1.0);
        let overrides = OptimOptions::default();

        // Act
        let err = run(&session, &mut bad, &overrides).expect_err("expected contract failure");

        // Assert
        match err {
            BridgeError::UnsupportedOptimizer { name, reason } => {
                assert_eq!(name, "gradient_descent");
                assert!(reason.contains("Step size"), "reason should explain the check: {reason}");
            }
            other => panic!("expected UnsupportedOptimizer, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the Driver counts one loss and one gradient evaluation
    // per gradient-descent iteration and writes the final vector back into
    // the graph.
    //
    // Given
    // -----
    // - A 1-D quadratic centered at 3, descent step 0.1, budget 10.
    //
    // Expect
    // ------
    // - 10 history entries, 10 loss evals, 10 grad evals.
    // - The session's stored parameters equal the report's final vector.
    fn driver_counts_evaluations_and_writes_back_final_params() {
        // Arrange
        let session = EvalSession::new(QuadGraph { params: array![0.0] });
        let mut gd = GradientDescent::new(0.1);
        let overrides = OptimOptions::new(Some(10), None, None).expect("overrides valid");

        // Act
        let report = run(&session, &mut gd, &overrides).expect("run should succeed");

        // Assert
        assert_eq!(report.history.len(), 10);
        assert_eq!(report.loss_evals, 10);
        assert_eq!(report.grad_evals, 10);
        let stored = session.flatten_params().expect("flatten should succeed");
        assert_eq!(stored, report.final_params);
    }
}
