//! Public contract surface for pluggable optimizers.
//!
//! - [`LossEval`]: the injected loss/gradient evaluator pair every
//!   optimizer drives.
//! - [`Optimizer`]: the capability a pluggable optimizer must implement.
//! - [`LineSearcher`]: choice of line search used by the quasi-Newton
//!   variant.
//!
//! Convention: optimizers *minimize* the session's loss directly; there is
//! no sign flip anywhere in the bridge.
use std::str::FromStr;

use crate::{
    errors::{BridgeError, BridgeResult},
    graph::Graph,
    history::LossTrace,
    options::OptimOptions,
    session::EvalSession,
    types::{Grad, Loss, ParamVec},
};

/// Loss and gradient evaluation at candidate parameter vectors.
///
/// This is the bridge's injected `lossFn`/`gradFn` pair as one capability,
/// so adapters around third-party libraries only need a single borrow.
/// Gradient evaluation writes into a caller-supplied buffer; optimizers
/// call it at high frequency and reuse their buffers.
///
/// Implementations mutate underlying graph state as a side channel —
/// callers must not assume the state is unchanged after either call — but
/// the numeric results depend only on the input vector.
pub trait LossEval {
    fn loss(&self, params: &ParamVec) -> BridgeResult<Loss>;
    fn grad(&self, out: &mut Grad, params: &ParamVec) -> BridgeResult<()>;
}

impl<G: Graph> LossEval for EvalSession<G> {
    fn loss(&self, params: &ParamVec) -> BridgeResult<Loss> {
        self.loss_at(params)
    }

    fn grad(&self, out: &mut Grad, params: &ParamVec) -> BridgeResult<()> {
        self.grad_at(out, params)
    }
}

/// The capability every pluggable optimizer must implement.
///
/// Required:
/// - `name()`: stable identifier used in diagnostics and
///   [`BridgeError::UnsupportedOptimizer`].
/// - `options()`: the instance's own option defaults; the Driver merges
///   its overrides over these with Driver precedence before a run.
/// - `optimize(eval, init, opts, trace)`: own the entire iterative loop —
///   step sizes, line searches, stopping criteria. Must record the loss
///   value *before* each parameter update it is about to accept into
///   `trace`, honor `opts.max_iter`, and return the final accepted
///   parameter vector.
///
/// Optional:
/// - `check()`: construction-time contract validation. The Driver calls it
///   before every run and reports failures as
///   [`BridgeError::UnsupportedOptimizer`].
///
/// All implementors are interchangeable wherever an optimizer instance is
/// required — built-in variants, adapters around third-party minimizers,
/// and user-defined loops alike.
pub trait Optimizer {
    fn name(&self) -> &str;
    fn options(&self) -> &OptimOptions;
    fn optimize<E: LossEval>(
        &mut self, eval: &E, init: ParamVec, opts: &OptimOptions, trace: &LossTrace,
    ) -> BridgeResult<ParamVec>;

    fn check(&self) -> BridgeResult<()> {
        Ok(())
    }
}

/// Choice of line search used inside the quasi-Newton solver.
///
/// Variants:
/// - `MoreThuente`: More–Thuente line search.
/// - `HagerZhang`: Hager–Zhang line search.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// [`BridgeError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = BridgeError;

    /// Parse a line-search choice from a string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(BridgeError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify case-insensitive parsing of line-search names and rejection of
    // unknown names.
    fn line_searcher_parses_case_insensitively() {
        // Arrange / Act / Assert
        assert_eq!("MoreThuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert_eq!("HAGERZHANG".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert!(matches!(
            "newton".parse::<LineSearcher>(),
            Err(BridgeError::InvalidLineSearch { .. })
        ));
    }
}
