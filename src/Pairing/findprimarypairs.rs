//! # FindPrimaryPairs
//!
//! ## Algorithm
//! Rounds over every reaction that is not yet resolved. In a round each pending reaction
//! gets its transport problem solved for the optimal value `z*`, then twice more on the
//! optimal face with two different pair rankings. When both rankings land on the same
//! integral assignment the optimum is taken as unique and the reaction is resolved;
//! otherwise it stays ambiguous and is retried.
//!
//! ## Propagation
//! Between rounds the confirmed index is rebuilt from the pairs of resolved reactions
//! (and the pairs ambiguous reactions agree on under both rankings). In the next round
//! those compound pairs receive a bonus in the tie-break objective of every reaction
//! containing them. Solves of one round only ever read the index of the previous one.
//!
//! ## Termination
//! Stops when nothing is pending, when `max_rounds` is reached, or when a round
//! changes neither a reaction state nor the index. Reactions still ambiguous are
//! reported with their discovery-order assignment.

use crate::Chemistry::element_weights::ElementWeights;
use crate::Chemistry::formula::Formula;
use crate::Network::model::Network;
use crate::Pairing::lp_service::LpSolver;
use crate::Pairing::predictor::PairPredictor;
use crate::Pairing::report::{PairResult, PredictionOutcome, RoundSummary};
use crate::Pairing::transport_lp::{PreparedReaction, TransportProblem, prepare_network};
use crate::errors::PairsError;
use log::{error, info};
use std::collections::HashSet;

/// tie-break weight of a pair already confirmed elsewhere; exceeds any rank preference
const CONFIRMED_BONUS: f64 = 4.0;
pub const DEFAULT_MAX_ROUNDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unprocessed,
    Resolved,
    Ambiguous,
}

/// Unordered compound id pairs known to transfer weighted atoms. Compartments are
/// ignored so a pairing in the cytosol also supports the same pairing elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmedIndex {
    pairs: HashSet<(String, String)>,
}

impl ConfirmedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    pub fn insert(&mut self, a: &str, b: &str) {
        self.pairs.insert(Self::key(a, b));
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// preference `1/(1+rank)` of each pair, rank taken in discovery order or with the
/// products reversed
fn rank_preference(reaction: &PreparedReaction, products_reversed: bool) -> Vec<f64> {
    let n_products = reaction.products.len();
    reaction
        .pairs()
        .iter()
        .map(|&(r, p)| {
            let p = if products_reversed { n_products - 1 - p } else { p };
            1.0 / (1.0 + (r * n_products + p) as f64)
        })
        .collect()
}

/// Per reaction bookkeeping of one run.
#[derive(Debug)]
struct Task {
    reaction: PreparedReaction,
    state: ResolutionState,
    /// discovery-order assignment, one transfer per candidate pair
    assignment: Option<Vec<Formula>>,
    /// assignment under the alternative ranking
    alternative: Option<Vec<Formula>>,
    failure: Option<PairsError>,
}

impl Task {
    fn is_pending(&self) -> bool {
        self.failure.is_none() && self.state != ResolutionState::Resolved
    }
}

/// LP-based pair predictor.
pub struct FindPrimaryPairs {
    solver: Box<dyn LpSolver>,
    max_rounds: usize,
}

impl FindPrimaryPairs {
    pub fn new(solver: Box<dyn LpSolver>, max_rounds: usize) -> Self {
        Self {
            solver,
            max_rounds: max_rounds.max(1),
        }
    }

    /// Both tie-broken assignments of one reaction under the given index snapshot.
    fn solve_reaction(
        &self,
        reaction: &PreparedReaction,
        weights: &ElementWeights,
        confirmed: &ConfirmedIndex,
    ) -> Result<(Vec<Formula>, Vec<Formula>), PairsError> {
        let (problem, _) = TransportProblem::formulate(reaction, weights);
        if let Some(forced) = problem.forced_assignment(reaction) {
            return Ok((forced.clone(), forced));
        }
        let optimum = problem.solve_primary(self.solver.as_ref())?;
        let bonus: Vec<f64> = reaction
            .pairs()
            .iter()
            .map(|&(r, p)| {
                let reactant = &reaction.reactants[r].compound.id;
                let product = &reaction.products[p].compound.id;
                if confirmed.contains(reactant, product) {
                    CONFIRMED_BONUS
                } else {
                    0.0
                }
            })
            .collect();
        let preference = |products_reversed: bool| -> Vec<f64> {
            rank_preference(reaction, products_reversed)
                .iter()
                .zip(&bonus)
                .map(|(rank, bonus)| rank + bonus)
                .collect()
        };
        let solver = self.solver.as_ref();
        let forward = problem.solve_tie_break(reaction, optimum, &preference(false), solver)?;
        let alternative = problem.solve_tie_break(reaction, optimum, &preference(true), solver)?;
        Ok((forward, alternative))
    }

    fn build_index(tasks: &[Task], weights: &ElementWeights) -> ConfirmedIndex {
        let mut index = ConfirmedIndex::new();
        for task in tasks.iter().filter(|t| t.failure.is_none()) {
            let (Some(assignment), Some(alternative)) = (&task.assignment, &task.alternative)
            else {
                continue;
            };
            let reaction = &task.reaction;
            for (k, &(r, p)) in reaction.pairs().iter().enumerate() {
                let transfer = &assignment[k];
                let agreed = match task.state {
                    ResolutionState::Resolved => true,
                    _ => !alternative[k].is_empty(),
                };
                if agreed && transfer.weighted_size(weights, 0.0) > 0.0 {
                    index.insert(
                        &reaction.reactants[r].compound.id,
                        &reaction.products[p].compound.id,
                    );
                }
            }
        }
        index
    }

    fn run_rounds(&self, tasks: &mut [Task], weights: &ElementWeights) -> Vec<RoundSummary> {
        let mut confirmed = ConfirmedIndex::new();
        let mut rounds = Vec::new();
        for round in 1..=self.max_rounds {
            let pending: Vec<usize> = (0..tasks.len()).filter(|&i| tasks[i].is_pending()).collect();
            if pending.is_empty() {
                break;
            }
            // every solve of this round reads the index of the previous round
            let results: Vec<(usize, Result<(Vec<Formula>, Vec<Formula>), PairsError>)> = pending
                .iter()
                .map(|&i| (i, self.solve_reaction(&tasks[i].reaction, weights, &confirmed)))
                .collect();

            let mut changed = false;
            let mut resolved = 0;
            for (i, result) in results {
                let task = &mut tasks[i];
                match result {
                    Ok((forward, alternative)) => {
                        let state = if forward == alternative {
                            resolved += 1;
                            ResolutionState::Resolved
                        } else {
                            ResolutionState::Ambiguous
                        };
                        changed |= state != task.state;
                        task.state = state;
                        task.assignment = Some(forward);
                        task.alternative = Some(alternative);
                    }
                    Err(e) => {
                        error!("reaction {} failed: {}", task.reaction.id, e);
                        task.failure = Some(e);
                        changed = true;
                    }
                }
            }
            let index = Self::build_index(tasks, weights);
            let index_changed = index != confirmed;
            confirmed = index;

            let outstanding = tasks.iter().filter(|t| t.is_pending()).count();
            info!(
                "round {}: {} processed, {} resolved, {} outstanding",
                round,
                pending.len(),
                resolved,
                outstanding
            );
            rounds.push(RoundSummary {
                round,
                processed: pending.len(),
                resolved,
                outstanding,
            });
            if !changed && !index_changed {
                info!("no change in round {}, stopping", round);
                break;
            }
        }
        rounds
    }
}

impl PairPredictor for FindPrimaryPairs {
    fn predict(
        &self,
        network: &Network,
        weights: &ElementWeights,
        excluded: &HashSet<String>,
    ) -> Result<PredictionOutcome, PairsError> {
        let (prepared, mut diagnostics) = prepare_network(network, excluded);
        // imbalance diagnostics are recorded once per reaction
        for reaction in &prepared {
            let (_, imbalance) = TransportProblem::formulate(reaction, weights);
            for diagnostic in imbalance {
                diagnostic.log();
                diagnostics.push(diagnostic);
            }
        }
        info!(
            "FindPrimaryPairs on {} reactions with solver {}, weights {}",
            prepared.len(),
            self.solver.name(),
            weights
        );

        let mut tasks: Vec<Task> = prepared
            .into_iter()
            .map(|reaction| Task {
                reaction,
                state: ResolutionState::Unprocessed,
                assignment: None,
                alternative: None,
                failure: None,
            })
            .collect();
        let rounds = self.run_rounds(&mut tasks, weights);

        let mut outcome = PredictionOutcome {
            diagnostics,
            rounds,
            ..PredictionOutcome::default()
        };
        let mut resolved = 0;
        for task in tasks {
            if let Some(failure) = task.failure {
                outcome.failures.push((task.reaction.id, failure));
                continue;
            }
            match task.state {
                ResolutionState::Resolved => resolved += 1,
                ResolutionState::Ambiguous => outcome.ambiguous.push(task.reaction.id.clone()),
                ResolutionState::Unprocessed => {}
            }
            let Some(assignment) = task.assignment else {
                continue;
            };
            for ((r, p), transfer) in task.reaction.pairs().into_iter().zip(assignment) {
                if transfer.is_empty() {
                    continue;
                }
                outcome.pairs.push(PairResult {
                    reaction: task.reaction.id.clone(),
                    reactant: task.reaction.reactants[r].compound.clone(),
                    product: task.reaction.products[p].compound.clone(),
                    transfer,
                });
            }
        }
        info!(
            "FindPrimaryPairs finished: {} resolved, {} ambiguous, {} failed",
            resolved,
            outcome.ambiguous.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "fpp"
    }
}
