//! Error type of the crate.
//!
//! Only structural problems are errors: bad configuration, unreadable model
//! files, and solver failures. Defects of individual reactions (missing
//! formulas, unbalanced elements) are recorded as
//! [`Diagnostic`](crate::Pairing::report::Diagnostic) values and never abort a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairsError {
    /// Element weight outside of [0, 1] or not a finite number.
    #[error("invalid weight {weight} for element '{element}': weights must lie in [0, 1]")]
    InvalidWeight { element: String, weight: f64 },

    /// Malformed `E=w,...` weight specification.
    #[error("cannot parse weight specification '{0}': expected entries like 'C=1' or '*=0.82'")]
    WeightSyntax(String),

    #[error("cannot parse formula '{formula}': {reason}")]
    Formula { formula: String, reason: String },

    #[error("cannot parse reaction equation '{equation}': {reason}")]
    Equation { equation: String, reason: String },

    /// Defect in a model or exclusion file, with the 1-based line number.
    #[error("{file}, line {line}: {reason}")]
    Load {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("invalid settings: {0}")]
    Settings(String),

    /// The transport problem of a reaction has no optimum. A well-formed
    /// transport LP is always feasible, so this points at malformed input.
    #[error("LP solver reported '{status}' for reaction {reaction}")]
    SolverStatus { reaction: String, status: String },

    #[error("LP solver backend error: {0}")]
    SolverBackend(String),

    /// Rounded transfer values no longer conserve the atoms of the reaction.
    #[error("rounded transfers of reaction {reaction} do not conserve element {element}")]
    RoundingMismatch { reaction: String, element: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
