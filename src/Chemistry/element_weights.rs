use crate::errors::PairsError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Symbol of the default weight in weight specifications.
pub const WILDCARD: &str = "*";
/// Added to every weight where a zero weight must still break ties: hydrogen then
/// follows the pairs chosen for weighted elements without ever deciding a pair itself.
pub const WEIGHT_FLOOR: f64 = 1e-3;

const DEFAULT_WILDCARD: f64 = 0.82;

/// Element weights in [0, 1] with a wildcard for every symbol without an explicit
/// entry. Variable groups are looked up like ordinary elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementWeights {
    weights: BTreeMap<String, f64>,
    wildcard: f64,
}

impl Default for ElementWeights {
    /// C=1, H=0, *=0.82
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([("C".to_string(), 1.0), ("H".to_string(), 0.0)]),
            wildcard: DEFAULT_WILDCARD,
        }
    }
}

impl ElementWeights {
    /// sets the weight of one symbol; `*` sets the wildcard
    pub fn set(&mut self, symbol: &str, weight: f64) -> Result<(), PairsError> {
        check_weight(symbol, weight)?;
        if symbol == WILDCARD {
            self.wildcard = weight;
        } else {
            self.weights.insert(symbol.to_string(), weight);
        }
        Ok(())
    }

    pub fn with(mut self, symbol: &str, weight: f64) -> Result<Self, PairsError> {
        self.set(symbol, weight)?;
        Ok(self)
    }

    pub fn get(&self, symbol: &str) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(self.wildcard)
    }

    pub fn wildcard(&self) -> f64 {
        self.wildcard
    }

    /// Parses `C=1,H=0,*=0.82`. Entries override the defaults, later entries override
    /// earlier ones.
    pub fn parse(spec: &str) -> Result<Self, PairsError> {
        let mut weights = Self::default();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((symbol, value)) = entry.split_once('=') else {
                return Err(PairsError::WeightSyntax(spec.to_string()));
            };
            let symbol = symbol.trim();
            if symbol.is_empty() {
                return Err(PairsError::WeightSyntax(spec.to_string()));
            }
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| PairsError::WeightSyntax(spec.to_string()))?;
            weights.set(symbol, value)?;
        }
        Ok(weights)
    }

    /// Builds weights from a symbol → weight map on top of the defaults, as stored in
    /// settings files.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, PairsError> {
        let mut weights = Self::default();
        // wildcard first so that explicit entries are applied on a settled default
        if let Some(&wildcard) = map.get(WILDCARD) {
            weights.set(WILDCARD, wildcard)?;
        }
        for (symbol, &weight) in map.iter().filter(|(s, _)| s.as_str() != WILDCARD) {
            weights.set(symbol, weight)?;
        }
        Ok(weights)
    }
}

fn check_weight(symbol: &str, weight: f64) -> Result<(), PairsError> {
    if weight.is_finite() && (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(PairsError::InvalidWeight {
            element: symbol.to_string(),
            weight,
        })
    }
}

impl FromStr for ElementWeights {
    type Err = PairsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementWeights::parse(s)
    }
}

impl fmt::Display for ElementWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, weight) in &self.weights {
            write!(f, "{}={},", symbol, weight)?;
        }
        write!(f, "{}={}", WILDCARD, self.wildcard)
    }
}
