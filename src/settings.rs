//! # Settings Module
//!
//! ## Purpose
//! Run configuration of a prediction: which method, which element weights, how many
//! refinement rounds, which element to report. Read from a JSON file; every field is
//! optional and falls back to its default.
//!
//! ## File format
//! ```json
//! {
//!   "method": "fpp",
//!   "weights": { "C": 1.0, "H": 0.0, "*": 0.82 },
//!   "max_rounds": 10,
//!   "report_element": "C"
//! }
//! ```
//! Command line flags override values read from the file.

use crate::Chemistry::element_weights::ElementWeights;
use crate::Pairing::findprimarypairs::DEFAULT_MAX_ROUNDS;
use crate::errors::PairsError;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Pair prediction method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// iterative transport LP (FindPrimaryPairs)
    #[default]
    Fpp,
    /// greedy similarity heuristic
    Mapmaker,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Fpp => write!(f, "fpp"),
            Method::Mapmaker => write!(f, "mapmaker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionSettings {
    pub method: Method,
    /// symbol -> weight, `*` for the wildcard; empty means the default weights
    pub weights: HashMap<String, f64>,
    pub max_rounds: usize,
    pub report_element: Option<String>,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            method: Method::Fpp,
            weights: HashMap::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            report_element: None,
        }
    }
}

impl PredictionSettings {
    pub fn from_json(text: &str) -> Result<Self, PairsError> {
        let settings: PredictionSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, PairsError> {
        let content = fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        info!("Loaded settings from file '{}'", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, PairsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), PairsError> {
        if self.max_rounds == 0 {
            return Err(PairsError::Settings(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if let Some(element) = &self.report_element {
            let valid = element
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_uppercase())
                && element.chars().skip(1).all(|c| c.is_ascii_lowercase());
            if !valid {
                return Err(PairsError::Settings(format!(
                    "'{}' is not an element symbol",
                    element
                )));
            }
        }
        self.element_weights().map(|_| ())
    }

    /// Weights of the run: the defaults with the configured entries applied.
    pub fn element_weights(&self) -> Result<ElementWeights, PairsError> {
        ElementWeights::from_map(&self.weights)
    }
}
