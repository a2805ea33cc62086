//! session — the live graph-evaluation context.
//!
//! Purpose
//! -------
//! Own one [`Graph`] and expose "loss at vector" and "gradient at vector"
//! as the two primitive operations every optimizer drives. Each call
//! unflattens the candidate vector into graph storage, executes the
//! forward (and, for gradients, backward) computation, and validates the
//! numeric result. Graph state is mutated as a side channel on every call;
//! callers must not assume it is unchanged afterwards.
//!
//! Key behaviors
//! -------------
//! - `loss_at` returns the scalar loss, rejecting non-finite values as
//!   [`BridgeError::NonFiniteLoss`] rather than letting them poison a run.
//! - `grad_at` writes into a caller-supplied buffer (optimizers call it at
//!   high frequency; no per-call allocation) and validates dimension and
//!   finiteness of the result.
//! - Graphs without a backward pass fall back to robust finite differences
//!   over `loss_at`: central differences first, retried with forward
//!   differences if any evaluation failed or the result fails validation.
//!   Errors raised inside the difference closure are captured through a
//!   `RefCell` and surfaced afterwards, since the closure itself must
//!   return `f64`.
//! - `begin_run` hands out an RAII guard enforcing one active optimization
//!   run per session; a second guard request fails with
//!   [`BridgeError::SessionBusy`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Evaluation is referentially transparent with respect to its numeric
//!   result for a fixed input vector and fixed external state; the graph
//!   may log or buffer internally, but the returned numbers depend only on
//!   the vector.
//! - The graph is held in a `RefCell` so evaluation can be invoked through
//!   shared references (the finite-difference closure and the Argmin
//!   problem adapter both require `&self` evaluation). The run guard, not
//!   the borrow checker, is therefore the documented defense against
//!   overlapping runs.
use std::cell::{Cell, RefCell};

use finitediff::FiniteDiff;

use crate::{
    codec::ParamCodec,
    errors::{BridgeError, BridgeResult},
    graph::Graph,
    types::{Grad, Loss, ParamVec},
    validation::{validate_grad, validate_loss},
};

/// Live evaluation context tying a [`Graph`] to its [`ParamCodec`].
///
/// Created at session initialization, mutated on every evaluation call,
/// torn down by dropping. Exactly one optimization run may be active at a
/// time; see [`EvalSession::begin_run`].
#[derive(Debug)]
pub struct EvalSession<G: Graph> {
    graph: RefCell<G>,
    codec: ParamCodec,
    active: Cell<bool>,
}

impl<G: Graph> EvalSession<G> {
    /// Take ownership of a graph and bind a codec to its current
    /// trainable-parameter count.
    pub fn new(graph: G) -> Self {
        let codec = ParamCodec::for_graph(&graph);
        Self { graph: RefCell::new(graph), codec, active: Cell::new(false) }
    }

    /// Number of trainable scalars the session marshals.
    pub fn param_count(&self) -> usize {
        self.codec.len()
    }

    /// Flatten the graph's current parameters into a fresh vector.
    pub fn flatten_params(&self) -> BridgeResult<ParamVec> {
        self.codec.flatten(&*self.graph.borrow())
    }

    /// Write `params` back into graph storage.
    ///
    /// # Errors
    /// [`BridgeError::ShapeMismatch`] on a wrong-length vector; the graph is
    /// left unchanged in that case.
    pub fn write_params(&self, params: &ParamVec) -> BridgeResult<()> {
        self.codec.unflatten(params, &mut *self.graph.borrow_mut())
    }

    /// Evaluate the loss at `params`.
    ///
    /// Unflattens the vector into graph storage, runs one forward pass, and
    /// validates the result.
    ///
    /// # Errors
    /// - [`BridgeError::ShapeMismatch`] from the codec.
    /// - [`BridgeError::NonFiniteLoss`] if the graph produced `NaN`/`±∞`.
    /// - Any error the graph's `forward` raises, unchanged.
    pub fn loss_at(&self, params: &ParamVec) -> BridgeResult<Loss> {
        let mut graph = self.graph.borrow_mut();
        self.codec.unflatten(params, &mut *graph)?;
        let loss = graph.forward()?;
        validate_loss(loss)?;
        Ok(loss)
    }

    /// Evaluate the gradient at `params`, writing into `out`.
    ///
    /// Runs the forward pass before the backward pass, so backward
    /// implementations may assume current forward state. When the graph
    /// reports [`BridgeError::GradientNotImplemented`], the gradient is
    /// computed by finite differences over [`EvalSession::loss_at`] instead.
    ///
    /// # Errors
    /// - [`BridgeError::ShapeMismatch`] if `out` or `params` has the wrong
    ///   length.
    /// - [`BridgeError::NonFiniteLoss`] if the forward pass is non-finite.
    /// - [`BridgeError::NonFiniteGradient`] /
    ///   [`BridgeError::GradientDimMismatch`] if the produced gradient
    ///   fails validation.
    /// - Any error raised by loss evaluations performed during finite
    ///   differencing.
    pub fn grad_at(&self, out: &mut Grad, params: &ParamVec) -> BridgeResult<()> {
        let dim = self.codec.len();
        if out.len() != dim {
            return Err(BridgeError::ShapeMismatch { expected: dim, actual: out.len() });
        }
        {
            let mut graph = self.graph.borrow_mut();
            self.codec.unflatten(params, &mut *graph)?;
            let loss = graph.forward()?;
            validate_loss(loss)?;
            match graph.backward(out.view_mut()) {
                Ok(()) => {
                    drop(graph);
                    validate_grad(out, dim)?;
                    return Ok(());
                }
                Err(BridgeError::GradientNotImplemented) => {}
                Err(e) => return Err(e),
            }
        }
        let fd_grad = self.fd_grad(params)?;
        out.assign(&fd_grad);
        Ok(())
    }

    /// Mark the session as mid-run, returning a guard that releases the
    /// mark on drop.
    ///
    /// # Errors
    /// [`BridgeError::SessionBusy`] if another run is already active.
    pub fn begin_run(&self) -> BridgeResult<RunGuard<'_, G>> {
        if self.active.get() {
            return Err(BridgeError::SessionBusy);
        }
        self.active.set(true);
        Ok(RunGuard { session: self })
    }

    /// Finite-difference gradient of the loss at `params`.
    ///
    /// Tries central differences first. If any loss evaluation inside the
    /// closure failed (captured via `closure_err`) or the result fails
    /// validation, retries once with forward differences.
    fn fd_grad(&self, params: &ParamVec) -> BridgeResult<Grad> {
        let closure_err: RefCell<Option<BridgeError>> = RefCell::new(None);
        let loss_fn = |x: &ParamVec| -> f64 {
            match self.loss_at(x) {
                Ok(value) => value,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = params.central_diff(&loss_fn);
        if closure_err.borrow().is_some() {
            return run_fd_retry(params, &loss_fn, &closure_err);
        }
        match validate_grad(&fd_grad, params.len()) {
            Ok(()) => Ok(fd_grad),
            Err(_) => run_fd_retry(params, &loss_fn, &closure_err),
        }
    }
}

/// RAII token proving exclusive use of a session for one optimization run.
#[derive(Debug)]
pub struct RunGuard<'a, G: Graph> {
    session: &'a EvalSession<G>,
}

impl<G: Graph> Drop for RunGuard<'_, G> {
    fn drop(&mut self) {
        self.session.active.set(false);
    }
}

/// Compute a forward-difference gradient of `func` at `params`, with error
/// capture.
///
/// The difference closure can't return `Result`, so any error raised by
/// `func` is stored into `closure_err` and the closure returns `NaN`. This
/// helper clears `closure_err`, performs `forward_diff`, surfaces a
/// captured error as `Err`, and otherwise validates the resulting gradient.
fn run_fd_retry<F: Fn(&ParamVec) -> f64>(
    params: &ParamVec, func: &F, closure_err: &RefCell<Option<BridgeError>>,
) -> BridgeResult<Grad> {
    closure_err.replace(None);
    let fd_grad = params.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, params.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayView1, ArrayViewMut1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Loss and analytic-gradient evaluation through the codec.
    // - Non-finite loss rejection.
    // - Out-buffer length validation in `grad_at`.
    // - The finite-difference fallback for graphs without a backward pass.
    // - The one-active-run session guard.
    //
    // They intentionally DO NOT cover:
    // - Full optimization runs (driver and integration tests).
    // -------------------------------------------------------------------------

    /// loss(x) = Σ (xᵢ − 3)², gradient 2(xᵢ − 3), with an optional analytic
    /// backward pass.
    struct QuadGraph {
        params: Array1<f64>,
        analytic: bool,
    }

    impl QuadGraph {
        fn new(params: Array1<f64>, analytic: bool) -> Self {
            Self { params, analytic }
        }
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
            if !self.analytic {
                return Err(BridgeError::GradientNotImplemented);
            }
            for (slot, &x) in out.iter_mut().zip(self.params.iter()) {
                *slot = 2.0 * (x - 3.0);
            }
            Ok(())
        }
    }

    struct NanGraph;

    impl Graph for NanGraph {
        fn param_count(&self) -> usize {
            1
        }

        fn read_params(&self, mut out: ArrayViewMut1<'_, f64>) {
            out.fill(0.0);
        }

        fn write_params(&mut self, _params: ArrayView1<'_, f64>) {}

        fn forward(&mut self) -> BridgeResult<Loss> {
            Ok(f64::NAN)
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `loss_at` unflattens the candidate vector and evaluates
    // the quadratic at it, not at the stored parameters.
    //
    // Given
    // -----
    // - A graph initialized at x = [0, 0].
    // - A candidate vector [3, 4].
    //
    // Expect
    // ------
    // - loss = (3−3)² + (4−3)² = 1.
    fn loss_at_evaluates_candidate_vector() {
        // Arrange
        let session = EvalSession::new(QuadGraph::new(array![0.0, 0.0], true));
        let candidate = array![3.0, 4.0];

        // Act
        let loss = session.loss_at(&candidate).expect("loss evaluation should succeed");

        // Assert
        assert!((loss - 1.0).abs() <= 1e-12, "loss = {loss}, expected 1.0");
    }

    #[test]
    // Purpose
    // -------
    // Verify that a graph producing NaN loss surfaces `NonFiniteLoss`
    // instead of returning the value.
    fn loss_at_rejects_non_finite_loss() {
        // Arrange
        let session = EvalSession::new(NanGraph);

        // Act
        let err = session.loss_at(&array![1.0]).expect_err("expected non-finite rejection");

        // Assert
        assert!(matches!(err, BridgeError::NonFiniteLoss { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `grad_at` rejects a wrong-length output buffer with
    // `ShapeMismatch` before evaluating anything.
    fn grad_at_rejects_wrong_length_out_buffer() {
        // Arrange
        let session = EvalSession::new(QuadGraph::new(array![0.0, 0.0], true));
        let mut too_short = Array1::zeros(1);

        // Act
        let err = session
            .grad_at(&mut too_short, &array![1.0, 2.0])
            .expect_err("expected buffer length rejection");

        // Assert
        assert_eq!(err, BridgeError::ShapeMismatch { expected: 2, actual: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Verify that the analytic backward pass and the finite-difference
    // fallback agree on the quadratic's gradient.
    //
    // Given
    // -----
    // - Two sessions over the same quadratic, one with and one without an
    //   analytic backward pass.
    // - The candidate vector [1, 5].
    //
    // Expect
    // ------
    // - Analytic gradient exactly 2(x−3) = [−4, 4].
    // - FD gradient within 1e-5 of the analytic one.
    fn fd_fallback_agrees_with_analytic_gradient() {
        // Arrange
        let analytic = EvalSession::new(QuadGraph::new(array![0.0, 0.0], true));
        let fallback = EvalSession::new(QuadGraph::new(array![0.0, 0.0], false));
        let candidate = array![1.0, 5.0];
        let mut g_analytic = Array1::zeros(2);
        let mut g_fd = Array1::zeros(2);

        // Act
        analytic.grad_at(&mut g_analytic, &candidate).expect("analytic gradient");
        fallback.grad_at(&mut g_fd, &candidate).expect("finite-difference gradient");

        // Assert
        assert!((g_analytic[0] + 4.0).abs() <= 1e-12);
        assert!((g_analytic[1] - 4.0).abs() <= 1e-12);
        for i in 0..2 {
            let diff = (g_analytic[i] - g_fd[i]).abs();
            assert!(diff <= 1e-5, "component {i}: analytic {}, fd {}", g_analytic[i], g_fd[i]);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the one-active-run guard: a second `begin_run` while a guard
    // is live fails with `SessionBusy`, and dropping the guard frees the
    // session again.
    fn begin_run_guard_enforces_single_active_run() {
        // Arrange
        let session = EvalSession::new(QuadGraph::new(array![0.0], true));

        // Act
        let guard = session.begin_run().expect("first run should acquire the session");
        let second = session.begin_run();

        // Assert
        assert!(matches!(second, Err(BridgeError::SessionBusy)));
        drop(guard);
        assert!(session.begin_run().is_ok(), "guard drop should release the session");
    }
}
