//! Built-in quasi-Newton variant backed by argmin's L-BFGS.
//!
//! This is simultaneously the bridge's reference adapter around a
//! third-party optimization library: the evaluator is exposed to argmin
//! through [`GraphProblem`], the solver is built by
//! [`crate::optimizer::builders`], and the per-iteration loss trajectory
//! is captured by an injected observer rather than trusted to the
//! library's own bookkeeping.
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{
    Error, Executor, KV, Solver,
    observers::{Observe, ObserverMode},
};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

use crate::{
    errors::{BridgeError, BridgeResult},
    history::LossTrace,
    optimizer::{
        adapter::GraphProblem,
        builders::{build_lbfgs_hager_zhang, build_lbfgs_more_thuente},
        traits::{LineSearcher, LossEval, Optimizer},
    },
    options::OptimOptions,
    types::{BridgeIterState, DEFAULT_LBFGS_MEM, DEFAULT_MAX_ITER, ParamVec},
    validation::validate_solution,
};

/// Multi-step quasi-Newton optimizer (L-BFGS with a configurable line
/// search).
///
/// Instance defaults: the crate iteration budget, a gradient tolerance of
/// `1e-6`, and an L-BFGS memory of [`DEFAULT_LBFGS_MEM`].
#[derive(Debug, Clone)]
pub struct QuasiNewton {
    line_searcher: LineSearcher,
    memory: Option<usize>,
    options: OptimOptions,
}

impl QuasiNewton {
    /// Create a quasi-Newton instance with the chosen line search.
    pub fn new(line_searcher: LineSearcher) -> Self {
        let options = OptimOptions {
            max_iter: Some(DEFAULT_MAX_ITER),
            tol_grad: Some(1e-6),
            ..OptimOptions::default()
        };
        Self { line_searcher, memory: None, options }
    }

    /// Override the L-BFGS history size (`m`).
    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Replace the instance's option defaults.
    pub fn with_options(mut self, options: OptimOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for QuasiNewton {
    fn default() -> Self {
        Self::new(LineSearcher::MoreThuente)
    }
}

impl Optimizer for QuasiNewton {
    fn name(&self) -> &str {
        "quasi_newton"
    }

    fn options(&self) -> &OptimOptions {
        &self.options
    }

    fn check(&self) -> BridgeResult<()> {
        if let Some(mem) = self.memory {
            if mem == 0 {
                return Err(BridgeError::InvalidLbfgsMemory {
                    mem,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(())
    }

    fn optimize<E: LossEval>(
        &mut self, eval: &E, init: ParamVec, opts: &OptimOptions, trace: &LossTrace,
    ) -> BridgeResult<ParamVec> {
        let mem = self.memory.unwrap_or(DEFAULT_LBFGS_MEM);
        let problem = GraphProblem::new(eval);
        match self.line_searcher {
            LineSearcher::MoreThuente => {
                let solver = build_lbfgs_more_thuente(mem, opts)?;
                run_solver(init, opts, problem, solver, trace)
            }
            LineSearcher::HagerZhang => {
                let solver = build_lbfgs_hager_zhang(mem, opts)?;
                run_solver(init, opts, problem, solver, trace)
            }
        }
    }
}

/// Observer that copies each iteration's loss into the Driver's trace.
///
/// Records the initial cost once at `observe_init` (the loss at the start
/// of iteration one) and the current cost after every iteration; the
/// Driver's budget truncation drops the surplus final entry of a run that
/// exhausts its budget.
struct TraceObserver {
    trace: LossTrace,
}

impl TraceObserver {
    fn new(trace: LossTrace) -> Self {
        Self { trace }
    }
}

impl Observe<BridgeIterState> for TraceObserver {
    fn observe_init(
        &mut self, _name: &str, state: &BridgeIterState, _kv: &KV,
    ) -> Result<(), Error> {
        if state.cost.is_finite() {
            self.trace.record(state.cost);
        }
        Ok(())
    }

    fn observe_iter(&mut self, state: &BridgeIterState, _kv: &KV) -> Result<(), Error> {
        if state.cost.is_finite() {
            self.trace.record(state.cost);
        }
        Ok(())
    }
}

/// Run an argmin solver on a bridged problem and return the final accepted
/// parameter vector.
///
/// This is the shared runner for all line-search variants. It wires up the
/// adapted problem, the injected [`TraceObserver`], the initial parameter
/// vector, the iteration budget, and (behind the `obs_slog` feature, when
/// `opts.verbose` is set) a terminal slog observer plus a one-time
/// pre-iteration line logging the initial loss and gradient norm.
///
/// # Errors
/// - Propagates any argmin runtime error (solver or line-search failures)
///   via the crate's `From<argmin::core::Error>` conversion; evaluator
///   errors captured inside argmin are recovered unchanged.
/// - Propagates validation errors on the final parameter vector.
fn run_solver<'e, E, S>(
    init: ParamVec, opts: &OptimOptions, problem: GraphProblem<'e, E>, solver: S,
    trace: &LossTrace,
) -> BridgeResult<ParamVec>
where
    E: LossEval,
    S: Solver<GraphProblem<'e, E>, BridgeIterState> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&init, &problem)?;
    }
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(init));
    executor = executor.add_observer(TraceObserver::new(trace.clone()), ObserverMode::Always);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, ObserverMode::Always);
    }
    if let Some(max_iter) = opts.max_iter {
        executor = executor.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = executor.run()?.state().clone();
    validate_solution(result.take_best_param())
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<E>(init: &ParamVec, problem: &GraphProblem<'_, E>) -> BridgeResult<()>
where
    E: LossEval,
{
    let l0 = problem.cost(init)?;
    let g0n = problem.gradient(init).ok().map(|g| g.l2_norm());

    eprintln!(
        "init: loss(x0) = {:.6}{}",
        l0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
