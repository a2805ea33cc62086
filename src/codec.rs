//! codec — flat-vector marshaling between graph storage and optimizers.
//!
//! Purpose
//! -------
//! Provide the parameter-vector codec: flatten a graph's trainable
//! parameters into one contiguous `ParamVec` and write an updated vector
//! back into the graph's parameter storage. The codec is the only place
//! where vector lengths are reconciled against the graph, so every other
//! layer can assume correctly sized vectors once a codec call succeeds.
//!
//! Key behaviors
//! -------------
//! - Capture the trainable-parameter count once, at construction, and hold
//!   it for the lifetime of a run.
//! - `flatten` produces a vector whose length and ordering are stable
//!   across repeated calls on an unmodified graph (ordering is delegated to
//!   [`Graph::read_params`], which documents the same requirement).
//! - `unflatten` length-checks **before** touching graph storage, so a
//!   rejected vector leaves the graph numerically identical.
//!
//! Invariants & assumptions
//! ------------------------
//! - `unflatten(flatten(g), g)` leaves `g` unchanged for any graph `g`
//!   whose `read_params`/`write_params` are inverses in the documented
//!   order.
//! - A codec is bound to the parameter count observed at construction; a
//!   graph that changes its parameter count mid-run surfaces as
//!   [`BridgeError::ShapeMismatch`] on the next codec call.
use ndarray::Array1;

use crate::{
    errors::{BridgeError, BridgeResult},
    graph::Graph,
    types::ParamVec,
};

/// Marshals trainable parameters between a [`Graph`] and flat vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamCodec {
    len: usize,
}

impl ParamCodec {
    /// Bind a codec to a graph's current trainable-parameter count.
    pub fn for_graph<G: Graph>(graph: &G) -> Self {
        Self { len: graph.param_count() }
    }

    /// Number of trainable scalars this codec marshals.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bound graph exposes no trainable parameters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Flatten the graph's current trainable parameters into a fresh vector.
    ///
    /// # Errors
    /// Returns [`BridgeError::ShapeMismatch`] if the graph's parameter count
    /// no longer matches the count captured at construction.
    pub fn flatten<G: Graph>(&self, graph: &G) -> BridgeResult<ParamVec> {
        self.check_graph(graph)?;
        let mut out = Array1::zeros(self.len);
        graph.read_params(out.view_mut());
        Ok(out)
    }

    /// Write `params` back into the graph's parameter storage.
    ///
    /// The length check happens before any write, so on error the graph is
    /// left numerically identical to before the call.
    ///
    /// # Errors
    /// Returns [`BridgeError::ShapeMismatch`] if `params.len()` differs from
    /// the bound parameter count, or if the graph's own count drifted.
    pub fn unflatten<G: Graph>(&self, params: &ParamVec, graph: &mut G) -> BridgeResult<()> {
        self.check_graph(graph)?;
        if params.len() != self.len {
            return Err(BridgeError::ShapeMismatch { expected: self.len, actual: params.len() });
        }
        graph.write_params(params.view());
        Ok(())
    }

    fn check_graph<G: Graph>(&self, graph: &G) -> BridgeResult<()> {
        let count = graph.param_count();
        if count != self.len {
            return Err(BridgeError::ShapeMismatch { expected: count, actual: self.len });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayView1, ArrayViewMut1, array};

    use crate::types::Loss;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The flatten/unflatten round-trip law.
    // - Determinism of repeated flatten calls on unmodified state.
    // - Length validation in `unflatten`, including that graph state is left
    //   untouched on the error path.
    //
    // They intentionally DO NOT cover:
    // - Loss/gradient evaluation (session layer).
    // -------------------------------------------------------------------------

    struct StoreGraph {
        values: Vec<f64>,
    }

    impl Graph for StoreGraph {
        fn param_count(&self) -> usize {
            self.values.len()
        }

        fn read_params(&self, mut out: ArrayViewMut1<'_, f64>) {
            for (slot, &v) in out.iter_mut().zip(self.values.iter()) {
                *slot = v;
            }
        }

        fn write_params(&mut self, params: ArrayView1<'_, f64>) {
            for (slot, &v) in self.values.iter_mut().zip(params.iter()) {
                *slot = v;
            }
        }

        fn forward(&mut self) -> crate::errors::BridgeResult<Loss> {
            Ok(self.values.iter().map(|v| v * v).sum())
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the round-trip law: unflattening the result of flatten leaves
    // the graph numerically identical.
    //
    // Given
    // -----
    // - A graph with three stored parameters.
    //
    // Expect
    // ------
    // - After `unflatten(flatten(g), g)`, the stored values are unchanged.
    fn flatten_unflatten_round_trip_is_identity() {
        // Arrange
        let mut graph = StoreGraph { values: vec![1.5, -2.0, 0.25] };
        let codec = ParamCodec::for_graph(&graph);
        let before = graph.values.clone();

        // Act
        let flat = codec.flatten(&graph).expect("flatten should succeed");
        codec.unflatten(&flat, &mut graph).expect("unflatten should succeed");

        // Assert
        assert_eq!(graph.values, before);
    }

    #[test]
    // Purpose
    // -------
    // Verify that repeated flatten calls on unmodified state produce
    // identical vectors (stable ordering).
    fn flatten_is_deterministic_on_unmodified_state() {
        // Arrange
        let graph = StoreGraph { values: vec![3.0, 1.0, 4.0, 1.0] };
        let codec = ParamCodec::for_graph(&graph);

        // Act
        let first = codec.flatten(&graph).expect("flatten should succeed");
        let second = codec.flatten(&graph).expect("flatten should succeed");

        // Assert
        assert_eq!(first, second);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `unflatten` rejects a wrong-length vector with
    // `ShapeMismatch` and leaves the graph untouched.
    //
    // Given
    // -----
    // - A graph with two parameters and a three-element candidate vector.
    //
    // Expect
    // ------
    // - `ShapeMismatch { expected: 2, actual: 3 }`.
    // - The stored values are unchanged.
    fn unflatten_rejects_wrong_length_and_preserves_state() {
        // Arrange
        let mut graph = StoreGraph { values: vec![7.0, 8.0] };
        let codec = ParamCodec::for_graph(&graph);
        let wrong = array![1.0_f64, 2.0_f64, 3.0_f64];

        // Act
        let err = codec.unflatten(&wrong, &mut graph).expect_err("expected length mismatch");

        // Assert
        assert_eq!(err, BridgeError::ShapeMismatch { expected: 2, actual: 3 });
        assert_eq!(graph.values, vec![7.0, 8.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a graph whose parameter count drifts after codec
    // construction is rejected rather than partially written.
    fn codec_detects_parameter_count_drift() {
        // Arrange
        let mut graph = StoreGraph { values: vec![1.0, 2.0, 3.0] };
        let codec = ParamCodec::for_graph(&graph);
        let flat = codec.flatten(&graph).expect("flatten should succeed");

        // Act: the graph grows a parameter behind the codec's back.
        graph.values.push(4.0);
        let err = codec.unflatten(&flat, &mut graph).expect_err("expected drift detection");

        // Assert
        assert!(matches!(err, BridgeError::ShapeMismatch { .. }));
    }
}
