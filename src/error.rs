//! Error taxonomy for the evolution engine.
//!
//! Every failure mode that can abort a derivative evaluation is a variant
//! here. None of these are used for ordinary control flow: the phase-boundary
//! pre-checks make `BracketError` unreachable on the normal path, and
//! `NumericalSingularity` only fires on physically degenerate compositions
//! (an exhausted phase). Callers that know how to recover (e.g. an adaptive
//! stepper shrinking its step) may catch and retry; by default an error
//! terminates the current integration step.

use thiserror::Error;

/// Failure modes of the thermal/chemical evolution engine.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The reaction linear system is not solvable to required precision.
    ///
    /// Raised instead of letting a shared near-zero denominator silently
    /// poison the rates with NaN/Inf.
    #[error("reaction system is numerically singular: {detail}")]
    NumericalSingularity { detail: String },

    /// A bracketed root-find was invoked without a sign change on `[lo, hi]`.
    #[error("root bracket [{lo:.6e}, {hi:.6e}] carries no sign change")]
    BracketError { lo: f64, hi: f64 },

    /// A bounded iterative search exhausted its iteration budget.
    #[error("search failed to converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    /// A state value left its physical domain (negative moles, negative
    /// temperature). Radius clamping in the pressure-to-radius conversion is
    /// the one documented exception; it warns instead of erroring.
    #[error("non-physical state: {what}")]
    NonPhysicalState { what: String },
}

impl ModelError {
    /// Shorthand used by the matrix assembly path.
    pub fn singular(detail: impl Into<String>) -> Self {
        ModelError::NumericalSingularity {
            detail: detail.into(),
        }
    }

    /// Shorthand for domain violations.
    pub fn non_physical(what: impl Into<String>) -> Self {
        ModelError::NonPhysicalState { what: what.into() }
    }
}
