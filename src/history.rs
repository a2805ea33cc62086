//! Loss trajectory capture shared between the Driver and a running optimizer.
//!
//! The Driver owns one [`LossTrace`] per run and injects it into the
//! optimizer — directly for built-in loops, via an Argmin observer for the
//! quasi-Newton variant. History capture therefore never depends on an
//! optimizer exposing its own trace. The handle is cheaply cloneable; all
//! clones append to the same buffer.
use std::sync::{Arc, Mutex};

use crate::types::Loss;

/// Ordered, append-only sequence of loss values, one per completed
/// iteration, returned to the caller at the end of a run.
pub type LossHistory = Vec<Loss>;

/// Shared recorder for per-iteration loss values.
///
/// The buffer lives behind `Arc<Mutex<_>>` because Argmin stores observers
/// as owned `'static` values; no actual cross-thread access occurs in the
/// bridge's single-threaded execution model.
#[derive(Debug, Clone, Default)]
pub struct LossTrace {
    inner: Arc<Mutex<Vec<Loss>>>,
}

impl LossTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one loss value to the trajectory.
    ///
    /// Optimizers call this exactly once per iteration, with the loss
    /// evaluated *before* the parameter update they are about to accept.
    pub fn record(&self, loss: Loss) {
        self.lock().push(loss);
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy the recorded trajectory, truncated to `budget` entries.
    ///
    /// The Driver uses this to guarantee that no run ever reports more
    /// entries than its merged iteration budget, regardless of optimizer
    /// behavior.
    pub fn snapshot_truncated(&self, budget: usize) -> LossHistory {
        let mut history = self.lock().clone();
        history.truncate(budget);
        history
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Loss>> {
        // Single-threaded by design; a poisoned lock can only mean a panic
        // mid-record, in which case the partial trace is still coherent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
