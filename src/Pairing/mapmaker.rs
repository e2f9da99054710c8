//! # Mapmaker
//!
//! Greedy pairing without a solver. For every reaction the candidate pairs are scored by
//! ```text
//! score(r, p) = ½ · (S(r,p) / W(r) + S(r,p) / W(p))
//! ```
//! where `S` is the weighted size of the atoms both remaining formulas share and `W` the
//! weighted size of each remaining formula (weights `w(e) + ε`). The best pair takes the
//! shared atoms out of both sides and the scores are recomputed, until no pair shares an
//! atom. Ties go to the pair discovered first. One pass per reaction, no rounds.

use crate::Chemistry::element_weights::{ElementWeights, WEIGHT_FLOOR};
use crate::Chemistry::formula::Formula;
use crate::Network::model::Network;
use crate::Pairing::predictor::PairPredictor;
use crate::Pairing::report::{PairResult, PredictionOutcome, RoundSummary};
use crate::Pairing::transport_lp::{PreparedReaction, prepare_network};
use crate::errors::PairsError;
use log::{debug, info};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapmaker;

impl Mapmaker {
    pub fn new() -> Self {
        Mapmaker
    }

    pub fn score(reactant: &Formula, product: &Formula, weights: &ElementWeights) -> f64 {
        let shared = reactant.shared_weight(product, weights, WEIGHT_FLOOR);
        if shared <= 0.0 {
            return 0.0;
        }
        let reactant_size = reactant.weighted_size(weights, WEIGHT_FLOOR);
        let product_size = product.weighted_size(weights, WEIGHT_FLOOR);
        0.5 * (shared / reactant_size + shared / product_size)
    }

    /// Transfer of every candidate pair of the reaction, in discovery order.
    pub fn assign(reaction: &PreparedReaction, weights: &ElementWeights) -> Vec<Formula> {
        let pairs = reaction.pairs();
        let mut reactants: Vec<Formula> =
            reaction.reactants.iter().map(|r| r.formula.clone()).collect();
        let mut products: Vec<Formula> =
            reaction.products.iter().map(|p| p.formula.clone()).collect();
        let mut transfers = vec![Formula::new(); pairs.len()];
        loop {
            let mut best: Option<(usize, f64)> = None;
            for (k, &(r, p)) in pairs.iter().enumerate() {
                let score = Self::score(&reactants[r], &products[p], weights);
                // strict comparison keeps the earliest pair on ties
                if score > 0.0 && best.is_none_or(|(_, top)| score > top) {
                    best = Some((k, score));
                }
            }
            let Some((k, score)) = best else {
                break;
            };
            let (r, p) = pairs[k];
            let shared = reactants[r].intersection(&products[p]);
            debug!(
                "{}: {} -> {} takes {} (score {:.4})",
                reaction.id, reaction.reactants[r].compound, reaction.products[p].compound, shared, score
            );
            reactants[r] = reactants[r].saturating_sub(&shared);
            products[p] = products[p].saturating_sub(&shared);
            for (symbol, count) in shared.iter() {
                transfers[k].add_atoms(symbol, count);
            }
        }
        transfers
    }
}

impl PairPredictor for Mapmaker {
    fn predict(
        &self,
        network: &Network,
        weights: &ElementWeights,
        excluded: &HashSet<String>,
    ) -> Result<PredictionOutcome, PairsError> {
        let (prepared, diagnostics) = prepare_network(network, excluded);
        info!(
            "Mapmaker on {} reactions, weights {}",
            prepared.len(),
            weights
        );
        let mut outcome = PredictionOutcome {
            diagnostics,
            ..PredictionOutcome::default()
        };
        for reaction in &prepared {
            let transfers = Self::assign(reaction, weights);
            for ((r, p), transfer) in reaction.pairs().into_iter().zip(transfers) {
                if transfer.is_empty() {
                    continue;
                }
                outcome.pairs.push(PairResult {
                    reaction: reaction.id.clone(),
                    reactant: reaction.reactants[r].compound.clone(),
                    product: reaction.products[p].compound.clone(),
                    transfer,
                });
            }
        }
        outcome.rounds.push(RoundSummary {
            round: 1,
            processed: prepared.len(),
            resolved: prepared.len(),
            outstanding: 0,
        });
        info!("Mapmaker finished: {} pairs", outcome.pairs.len());
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "mapmaker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network::model::{Compound, Direction, Reaction};
    use crate::Pairing::transport_lp::prepare_reaction;
    use approx::assert_relative_eq;

    fn formula(text: &str) -> Formula {
        text.parse().unwrap()
    }

    #[test]
    fn test_score() {
        let weights = ElementWeights::default();
        let glc = formula("C6H12O6");
        assert_relative_eq!(Mapmaker::score(&glc, &glc, &weights), 1.0, epsilon = 1e-12);
        assert_eq!(Mapmaker::score(&glc, &formula("N2"), &weights), 0.0);
        let half = Mapmaker::score(&formula("C2"), &formula("C4"), &weights);
        assert_relative_eq!(half, 0.5 * (1.0 + 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_acetate_kinase() {
        let network = Network::new()
            .with_formula("atp", "C10H12N5O13P3")
            .and_then(|n| n.with_formula("ac", "C2H3O2"))
            .and_then(|n| n.with_formula("adp", "C10H12N5O10P2"))
            .and_then(|n| n.with_formula("actp", "C2H3O5P"))
            .unwrap();
        let reaction = Reaction::new(
            "ACKr",
            Direction::Both,
            vec![
                (Compound::new("atp"), -1.0),
                (Compound::new("ac"), -1.0),
                (Compound::new("adp"), 1.0),
                (Compound::new("actp"), 1.0),
            ],
        );
        let prepared = prepare_reaction(&reaction, &network).unwrap();
        let transfers = Mapmaker::assign(&prepared, &ElementWeights::default());
        let shown: Vec<String> = transfers.iter().map(|t| t.to_string()).collect();
        assert_eq!(shown, vec!["C10H12N5O10P2", "O3P", "", "C2H3O2"]);
    }

    #[test]
    fn test_tolerates_imbalance() {
        let network = Network::new()
            .with_formula("a", "C3H8")
            .and_then(|n| n.with_formula("b", "C2H4"))
            .unwrap()
            .with_reaction(Reaction::new(
                "R1",
                Direction::Forward,
                vec![(Compound::new("a"), -1.0), (Compound::new("b"), 1.0)],
            ));
        let outcome = Mapmaker::new()
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].transfer.to_string(), "C2H4");
        assert_eq!(outcome.rounds.len(), 1);
    }

    #[test]
    fn test_ties_go_to_discovery_order() {
        let network = Network::new()
            .with_formula("a", "C2H6")
            .and_then(|n| n.with_formula("b", "C2H6"))
            .and_then(|n| n.with_formula("c", "C2H6"))
            .and_then(|n| n.with_formula("d", "C2H6"))
            .unwrap();
        let reaction = Reaction::new(
            "R_tie",
            Direction::Forward,
            vec![
                (Compound::new("a"), -1.0),
                (Compound::new("b"), -1.0),
                (Compound::new("c"), 1.0),
                (Compound::new("d"), 1.0),
            ],
        );
        let prepared = prepare_reaction(&reaction, &network).unwrap();
        let transfers = Mapmaker::assign(&prepared, &ElementWeights::default());
        assert_eq!(transfers[0].to_string(), "C2H6");
        assert!(transfers[1].is_empty());
        assert!(transfers[2].is_empty());
        assert_eq!(transfers[3].to_string(), "C2H6");
    }
}
