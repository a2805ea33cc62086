//! High-level entry point for optimizing a session's loss.
//!
//! This is the one call an end user needs: hand over the evaluation
//! session, a configured optimizer instance, and per-run option overrides;
//! all marshaling — flattening, instrumentation, option merging, history
//! capture, write-back — happens behind it in [`crate::driver`].
use crate::{
    driver::run,
    errors::BridgeResult,
    graph::Graph,
    history::LossHistory,
    optimizer::traits::Optimizer,
    options::OptimOptions,
    session::EvalSession,
};

/// Optimize the session's loss with the given optimizer instance.
///
/// # Behavior
/// - Validates the instance against the optimizer contract
///   (`UnsupportedOptimizer` on failure).
/// - Merges `overrides` over the instance's option defaults with Driver
///   precedence; in particular the iteration budget and convergence
///   tolerances are taken from `overrides` whenever supplied there.
/// - Runs the optimizer against the session's current parameters, leaves
///   the graph holding the final accepted vector, and returns the
///   per-iteration loss trajectory.
///
/// # Errors
/// Propagates every bridge error unchanged — contract, option, marshaling,
/// and numerical failures alike. No partial history is returned on
/// failure.
///
/// # Example
/// ```no_run
/// use graph_optim::prelude::*;
/// # use graph_optim::errors::BridgeResult;
/// # use ndarray::{ArrayView1, ArrayViewMut1};
/// # struct MyGraph;
/// # impl Graph for MyGraph {
/// #     fn param_count(&self) -> usize { 1 }
/// #     fn read_params(&self, mut out: ArrayViewMut1<'_, f64>) { out.fill(0.0) }
/// #     fn write_params(&mut self, _params: ArrayView1<'_, f64>) {}
/// #     fn forward(&mut self) -> BridgeResult<f64> { Ok(0.0) }
/// # }
/// # fn main() -> BridgeResult<()> {
/// let session = EvalSession::new(MyGraph);
/// let mut optimizer = GradientDescent::new(0.1);
/// let overrides = OptimOptions::new(Some(50), None, None)?;
/// let history = optimize(&session, &mut optimizer, &overrides)?;
/// println!("final loss: {:?}", history.last());
/// # Ok(())
/// # }
/// ```
pub fn optimize<G: Graph, O: Optimizer>(
    session: &EvalSession<G>, optimizer: &mut O, overrides: &OptimOptions,
) -> BridgeResult<LossHistory> {
    Ok(run(session, optimizer, overrides)?.history)
}
