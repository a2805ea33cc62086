//! The external graph boundary.
//!
//! The bridge makes no assumption about how a computational graph evaluates
//! its loss or its gradient — only that the three capabilities below exist
//! and are deterministic for fixed parameter state. Autodiff engines, PDE
//! solvers, and hand-written objectives all plug in here.
use ndarray::{ArrayView1, ArrayViewMut1};

use crate::{
    errors::{BridgeError, BridgeResult},
    types::Loss,
};

/// Differentiable computation driven by the bridge.
///
/// Implementors own the parameter storage and any internal buffers needed to
/// execute the forward (and optionally backward) computation. The bridge
/// reads and writes parameters only through [`Graph::read_params`] and
/// [`Graph::write_params`]; it never inspects the storage layout.
///
/// Required:
/// - `param_count() -> usize`: number of trainable scalars. Must stay fixed
///   for the lifetime of one optimization run.
/// - `read_params(out)`: copy the current trainable parameters into `out`
///   in a stable, deterministic order. Repeated calls on unmodified state
///   must produce identical vectors — optimizers cache vector positions.
/// - `write_params(params)`: overwrite the trainable parameters from a
///   vector in the same order `read_params` uses. The caller guarantees
///   `params.len() == param_count()`.
/// - `forward() -> BridgeResult<Loss>`: execute the graph at the current
///   parameter state and return the scalar loss.
///
/// Optional:
/// - `backward(out)`: write the gradient of the loss with respect to the
///   parameters into `out`, in `read_params` order. Implementations are
///   entitled to assume `forward` semantics for the current state; the
///   session always unflattens before calling either. If not implemented,
///   the session falls back to finite differences over `forward`.
pub trait Graph {
    fn param_count(&self) -> usize;
    fn read_params(&self, out: ArrayViewMut1<'_, f64>);
    fn write_params(&mut self, params: ArrayView1<'_, f64>);
    fn forward(&mut self) -> BridgeResult<Loss>;

    fn backward(&mut self, _out: ArrayViewMut1<'_, f64>) -> BridgeResult<()> {
        Err(BridgeError::GradientNotImplemented)
    }
}
