//! Adapter that exposes a [`LossEval`] as an `argmin` problem.
//!
//! Any third-party library with a minimize-given-function-and-gradient
//! call can be bridged this way: borrow the evaluator, forward loss and
//! gradient queries, and translate errors at the boundary. The bridge's
//! quasi-Newton variant uses this adapter to drive argmin's L-BFGS; it is
//! public so user code can wrap other argmin solvers the same way.
use argmin::core::{CostFunction, Error, Gradient};

use crate::{
    optimizer::traits::LossEval,
    types::{Grad, Loss, ParamVec},
};

/// Bridges a [`LossEval`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// Loss values are minimized as-is; gradients are evaluated into a fresh
/// buffer per call because argmin's `Gradient` contract returns an owned
/// vector.
#[derive(Debug, Clone)]
pub struct GraphProblem<'e, E: LossEval> {
    pub eval: &'e E,
}

impl<'e, E: LossEval> GraphProblem<'e, E> {
    /// Construct a new adapter over a borrowed evaluator.
    pub fn new(eval: &'e E) -> Self {
        Self { eval }
    }
}

impl<'e, E: LossEval> CostFunction for GraphProblem<'e, E> {
    type Param = ParamVec;
    type Output = Loss;

    /// Evaluate the loss at `params`.
    ///
    /// # Errors
    /// Propagates any `BridgeError` from the evaluator via `?`; non-finite
    /// losses have already been rejected by the session.
    fn cost(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.eval.loss(params)?)
    }
}

impl<'e, E: LossEval> Gradient for GraphProblem<'e, E> {
    type Param = ParamVec;
    type Gradient = Grad;

    /// Evaluate the gradient at `params`.
    ///
    /// # Errors
    /// Propagates any `BridgeError` from the evaluator via `?`; dimension
    /// and finiteness have already been validated by the session.
    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, Error> {
        let mut out = Grad::zeros(params.len());
        self.eval.grad(&mut out, params)?;
        Ok(out)
    }
}
