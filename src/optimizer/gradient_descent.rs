//! Built-in naive gradient-descent variant.
//!
//! A fixed-step descent loop, mostly useful as a reference implementation
//! of the optimizer contract and as a predictable baseline in tests. Each
//! iteration records the current loss *before* taking the step it is about
//! to accept, so the returned trajectory reflects loss-at-start-of-
//! iteration.
use argmin_math::ArgminL2Norm;

use crate::{
    errors::{BridgeError, BridgeResult},
    history::LossTrace,
    optimizer::traits::{LossEval, Optimizer},
    options::OptimOptions,
    types::{DEFAULT_MAX_ITER, Grad, ParamVec},
};

/// Fixed-step gradient descent: `x ← x − step · ∇loss(x)`.
///
/// Stopping criteria, all optional via [`OptimOptions`]:
/// - iteration budget (`max_iter`, instance default
///   [`DEFAULT_MAX_ITER`]),
/// - gradient norm below `tol_grad`,
/// - absolute loss change between consecutive iterations below `tol_loss`.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    step: f64,
    options: OptimOptions,
}

impl GradientDescent {
    /// Create a descent instance with the given step size and the instance
    /// default iteration budget.
    pub fn new(step: f64) -> Self {
        let options = OptimOptions { max_iter: Some(DEFAULT_MAX_ITER), ..OptimOptions::default() };
        Self { step, options }
    }

    /// Replace the instance's option defaults.
    pub fn with_options(mut self, options: OptimOptions) -> Self {
        self.options = options;
        self
    }

    /// Configured step size.
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Optimizer for GradientDescent {
    fn name(&self) -> &str {
        "gradient_descent"
    }

    fn options(&self) -> &OptimOptions {
        &self.options
    }

    fn check(&self) -> BridgeResult<()> {
        if !self.step.is_finite() {
            return Err(BridgeError::InvalidStepSize {
                step: self.step,
                reason: "Step size must be finite.",
            });
        }
        if self.step <= 0.0 {
            return Err(BridgeError::InvalidStepSize {
                step: self.step,
                reason: "Step size must be strictly positive.",
            });
        }
        Ok(())
    }

    fn optimize<E: LossEval>(
        &mut self, eval: &E, init: ParamVec, opts: &OptimOptions, trace: &LossTrace,
    ) -> BridgeResult<ParamVec> {
        let budget = opts.max_iter.unwrap_or(DEFAULT_MAX_ITER);
        let mut x = init;
        let mut grad = Grad::zeros(x.len());
        let mut prev_loss: Option<f64> = None;

        for _ in 0..budget {
            let loss = eval.loss(&x)?;
            trace.record(loss);
            if let (Some(tol), Some(prev)) = (opts.tol_loss, prev_loss) {
                if (prev - loss).abs() < tol {
                    break;
                }
            }
            prev_loss = Some(loss);

            eval.grad(&mut grad, &x)?;
            if let Some(tol) = opts.tol_grad {
                if grad.l2_norm() < tol {
                    break;
                }
            }
            x.scaled_add(-self.step, &grad);
        }
        Ok(x)
    }
}
