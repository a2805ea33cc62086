//! builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the L-BFGS solvers used by the
//! quasi-Newton optimizer variant. These helpers hide Argmin's generic
//! wiring and apply bridge-level options (tolerances, memory size) so that
//! higher-level code can request a configured solver without touching
//! Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct L-BFGS solvers with either Hager–Zhang or More–Thuente line
//!   search based on the crate-level aliases in [`crate::types`].
//! - Apply optional gradient and loss-change tolerances from
//!   [`OptimOptions`] via a shared configuration helper.
//! - Leave the initial parameter vector and the iteration budget to the
//!   runner layer, keeping these builders side-effect free.
//!
//! Conventions
//! -----------
//! - Errors are always reported via [`BridgeResult`]; underlying
//!   `argmin::core::Error` values never leak across module boundaries.
//! - [`configure_lbfgs`] is generic over the line-search type and can be
//!   reused by future L-BFGS variants if needed.
use argmin::solver::quasinewton::LBFGS;

use crate::{
    errors::BridgeResult,
    options::OptimOptions,
    types::{Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, Loss, MoreThuenteLS, ParamVec},
};

/// Construct an L-BFGS solver with Hager–Zhang line search.
///
/// `mem` is the L-BFGS history size; tolerances present in `opts` are wired
/// into the solver, absent ones leave Argmin's defaults in effect.
///
/// # Errors
/// Returns a [`crate::errors::BridgeError`] (via the crate's
/// `From<argmin::core::Error>`) when Argmin rejects a tolerance setting.
pub fn build_lbfgs_hager_zhang(mem: usize, opts: &OptimOptions) -> BridgeResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct an L-BFGS solver with More–Thuente line search.
///
/// Same contract as [`build_lbfgs_hager_zhang`] with the alternative line
/// search.
///
/// # Errors
/// Returns a [`crate::errors::BridgeError`] when Argmin rejects a tolerance
/// setting.
pub fn build_lbfgs_more_thuente(mem: usize, opts: &OptimOptions) -> BridgeResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional tolerances to an L-BFGS solver, regardless of the
/// line-search type.
///
/// When a tolerance is `None`, the corresponding `with_tolerance_*` method
/// is not called and Argmin's defaults remain in effect. This helper does
/// not touch the solver's initial parameter vector or iteration budget;
/// those are runtime concerns applied by the runner.
///
/// # Errors
/// Returns a [`crate::errors::BridgeError`] when `with_tolerance_grad` or
/// `with_tolerance_cost` rejects a value.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, ParamVec, Grad, Loss>, opts: &OptimOptions,
) -> BridgeResult<LBFGS<L, ParamVec, Grad, Loss>> {
    if let Some(g) = opts.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tol_loss {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_LBFGS_MEM;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Basic construction of L-BFGS solvers with both line searches.
    // - Tolerance application via `configure_lbfgs`, present and absent.
    //
    // They intentionally DO NOT cover:
    // - End-to-end executor behavior (quasi-Newton runner and integration
    //   tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure both builders succeed with the crate default memory and a
    // typical tolerance configuration.
    fn builders_succeed_with_default_memory_and_tolerances() {
        // Arrange
        let opts = OptimOptions::new(Some(50), Some(1e-6), Some(1e-8))
            .expect("options should be valid");

        // Act
        let hager_zhang = build_lbfgs_hager_zhang(DEFAULT_LBFGS_MEM, &opts);
        let more_thuente = build_lbfgs_more_thuente(DEFAULT_LBFGS_MEM, &opts);

        // Assert
        assert!(hager_zhang.is_ok(), "Hager–Zhang builder should succeed for valid tolerances");
        assert!(more_thuente.is_ok(), "More–Thuente builder should succeed for valid tolerances");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `configure_lbfgs` leaves the solver constructible when
    // both tolerances are `None`, relying on Argmin defaults.
    fn configure_lbfgs_respects_absent_tolerances() {
        // Arrange
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let opts = OptimOptions::new(Some(50), None, None).expect("options should be valid");

        // Act
        let configured = configure_lbfgs(raw, &opts);

        // Assert
        assert!(configured.is_ok(), "configure_lbfgs should succeed when both tolerances are None");
    }

    #[test]
    // Purpose
    // -------
    // Verify that an explicit memory value is accepted by both builders.
    fn builders_respect_explicit_memory() {
        // Arrange
        let opts = OptimOptions::new(Some(25), Some(1e-6), None).expect("options should be valid");

        // Act / Assert
        assert!(build_lbfgs_hager_zhang(11, &opts).is_ok());
        assert!(build_lbfgs_more_thuente(9, &opts).is_ok());
    }
}
