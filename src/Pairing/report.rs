use crate::Chemistry::formula::Formula;
use crate::Network::model::Compound;
use crate::errors::PairsError;
use log::{debug, warn};
use prettytable::{Cell, Row, Table};
use std::fmt;

/// One predicted primary pair: the atoms `transfer` move from `reactant` to `product`
/// in `reaction`. Never holds an empty transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    pub reaction: String,
    pub reactant: Compound,
    pub product: Compound,
    pub transfer: Formula,
}

/// Defect of a single reaction. Recorded and logged, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// a participant has no formula, the whole reaction is skipped
    MissingFormula { reaction: String, compound: Compound },
    /// coefficients cannot be brought to small integers, the reaction is skipped
    IrregularStoichiometry { reaction: String },
    /// scaled atom counts exceed the counter range, the reaction is skipped
    AtomCountOverflow { reaction: String },
    /// element left out of the reaction's optimization
    ElementImbalance {
        reaction: String,
        element: String,
        reactant_atoms: u64,
        product_atoms: u64,
    },
    /// no reactant or no product: nothing to pair
    NoCounterpart { reaction: String },
}

impl Diagnostic {
    pub fn reaction(&self) -> &str {
        match self {
            Diagnostic::MissingFormula { reaction, .. }
            | Diagnostic::IrregularStoichiometry { reaction }
            | Diagnostic::AtomCountOverflow { reaction }
            | Diagnostic::ElementImbalance { reaction, .. }
            | Diagnostic::NoCounterpart { reaction } => reaction,
        }
    }

    /// true when the reaction takes no part in pairing at all
    pub fn skips_reaction(&self) -> bool {
        !matches!(self, Diagnostic::ElementImbalance { .. })
    }

    pub fn log(&self) {
        match self {
            Diagnostic::NoCounterpart { .. } => debug!("{}", self),
            _ => warn!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingFormula { reaction, compound } => write!(
                f,
                "reaction {} skipped: compound {} has no formula",
                reaction, compound
            ),
            Diagnostic::IrregularStoichiometry { reaction } => write!(
                f,
                "reaction {} skipped: stoichiometry cannot be made integral",
                reaction
            ),
            Diagnostic::AtomCountOverflow { reaction } => write!(
                f,
                "reaction {} skipped: scaled atom counts are too large",
                reaction
            ),
            Diagnostic::ElementImbalance {
                reaction,
                element,
                reactant_atoms,
                product_atoms,
            } => write!(
                f,
                "reaction {}: element {} is not balanced ({} reactant atoms, {} product atoms) and is ignored",
                reaction, element, reactant_atoms, product_atoms
            ),
            Diagnostic::NoCounterpart { reaction } => {
                write!(f, "reaction {} has no reactant/product counterpart", reaction)
            }
        }
    }
}

/// Per round progress of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: usize,
    /// reactions optimized in this round
    pub processed: usize,
    /// reactions that became resolved in this round
    pub resolved: usize,
    /// reactions neither resolved nor failed after this round
    pub outstanding: usize,
}

/// Everything a prediction run produces.
#[derive(Debug, Default)]
pub struct PredictionOutcome {
    pub pairs: Vec<PairResult>,
    /// reactions reported with a tie-broken, not uniquely forced, assignment
    pub ambiguous: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// reactions whose optimization failed; they have no pairs
    pub failures: Vec<(String, PairsError)>,
    pub rounds: Vec<RoundSummary>,
}

impl PredictionOutcome {
    pub fn pairs_of<'a>(&'a self, reaction: &'a str) -> impl Iterator<Item = &'a PairResult> + 'a {
        self.pairs.iter().filter(move |p| p.reaction == reaction)
    }
}

/// Restricts every transfer to `element` and drops the pairs left empty. The order of
/// the remaining pairs is kept. `None` returns the pairs unchanged.
pub fn filter_by_element(pairs: &[PairResult], element: Option<&str>) -> Vec<PairResult> {
    let Some(element) = element else {
        return pairs.to_vec();
    };
    pairs
        .iter()
        .filter_map(|pair| {
            let transfer = pair.transfer.only(element);
            if transfer.is_empty() {
                None
            } else {
                Some(PairResult {
                    transfer,
                    ..pair.clone()
                })
            }
        })
        .collect()
}

/// `reaction<TAB>reactant<TAB>product<TAB>formula`
pub fn format_pair_line(pair: &PairResult) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        pair.reaction, pair.reactant, pair.product, pair.transfer
    )
}

pub fn round_summary_table(rounds: &[RoundSummary]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Round"),
        Cell::new("Processed"),
        Cell::new("Resolved"),
        Cell::new("Outstanding"),
    ]));
    for summary in rounds {
        table.add_row(Row::new(vec![
            Cell::new(&summary.round.to_string()),
            Cell::new(&summary.processed.to_string()),
            Cell::new(&summary.resolved.to_string()),
            Cell::new(&summary.outstanding.to_string()),
        ]));
    }
    table
}
