//! # Per-Reaction Transport Problem
//!
//! ## Purpose
//! Turns one reaction into a bipartite transport problem: for every element `e` and
//! every (reactant r, product p) that both contain `e`, a variable `x[r,p,e]` tells how
//! many atoms of `e` the pair exchanges.
//!
//! ## Constraints
//! - reactant side: `Σ_p x[r,p,e] = n_r(e)`
//! - product side:  `Σ_r x[r,p,e] = n_p(e)`
//! - bounds: `0 ≤ x[r,p,e] ≤ min(n_r(e), n_p(e))`
//!
//! where `n` are the atom counts multiplied by the (integral) stoichiometric
//! coefficients. Elements with different reactant and product totals are left out
//! of the problem and reported as [`Diagnostic::ElementImbalance`].
//!
//! ## Objective
//! Maximize `Σ (w(e) + ε)·(1 + S(r,p))·x[r,p,e]` where `S(r,p)` is the element-weighted
//! similarity of the two formulas. With both sides fixed the plain `Σ w(e)·x` would be the
//! same for every feasible assignment; the similarity factor is what makes atoms flow
//! between alike compounds. Each element block is a transportation polytope, so the
//! optimal vertices are integral.
//!
//! ## Tie-breaking
//! [`TransportProblem::tie_break`] restricts the problem to its optimal face and
//! maximizes a per-pair preference instead, with integer variables (the extra face
//! constraint breaks total unimodularity).

use crate::Chemistry::element_weights::{ElementWeights, WEIGHT_FLOOR};
use crate::Chemistry::formula::Formula;
use crate::Network::model::{Compound, Network, Reaction};
use crate::Pairing::lp_service::{LpOutcome, LpProblem, LpSolver, Relation, Sense};
use crate::Pairing::report::Diagnostic;
use crate::errors::PairsError;
use std::collections::{BTreeSet, HashSet};

/// largest multiplier tried to make stoichiometric coefficients integral
const MAX_SCALE: u32 = 1000;
const SCALE_TOLERANCE: f64 = 1e-6;
/// absolute slack of the optimal-face constraint, independent of the reaction size and
/// well below the objective change of rerouting a single atom
pub const FACE_TOLERANCE: f64 = 1e-6;

/// A reactant or product with its formula multiplied by its coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub compound: Compound,
    pub formula: Formula,
}

/// Reaction with integral coefficients and formulas attached, ready for pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedReaction {
    pub id: String,
    pub reactants: Vec<Participant>,
    pub products: Vec<Participant>,
    /// multiplier applied to the coefficients, 1 for integral reactions
    pub scale: u32,
}

impl PreparedReaction {
    /// candidate pairs (reactant index, product index), reactant-major
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.reactants.len() * self.products.len());
        for r in 0..self.reactants.len() {
            for p in 0..self.products.len() {
                pairs.push((r, p));
            }
        }
        pairs
    }

    /// symbols present in at least one participant
    pub fn elements(&self) -> BTreeSet<String> {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .flat_map(|participant| participant.formula.element_set())
            .collect()
    }

    pub fn reactant_total(&self, element: &str) -> u64 {
        self.reactants
            .iter()
            .map(|r| u64::from(r.formula.count(element)))
            .sum()
    }

    pub fn product_total(&self, element: &str) -> u64 {
        self.products
            .iter()
            .map(|p| u64::from(p.formula.count(element)))
            .sum()
    }
}

/// Smallest multiplier turning all coefficients into integers.
pub fn integral_scale(coefficients: &[f64]) -> Option<u32> {
    (1..=MAX_SCALE).find(|&m| {
        coefficients.iter().all(|c| {
            let scaled = c.abs() * m as f64;
            (scaled - scaled.round()).abs() < SCALE_TOLERANCE
        })
    })
}

/// Attaches formulas and integral coefficients to a reaction. Returns `Err` with the
/// reason when the reaction cannot take part in pairing.
pub fn prepare_reaction(
    reaction: &Reaction,
    network: &Network,
) -> Result<PreparedReaction, Diagnostic> {
    for (compound, _) in &reaction.compounds {
        if network.formula(compound).is_none() {
            return Err(Diagnostic::MissingFormula {
                reaction: reaction.id.clone(),
                compound: compound.clone(),
            });
        }
    }
    let coefficients: Vec<f64> = reaction.compounds.iter().map(|(_, c)| *c).collect();
    let Some(scale) = integral_scale(&coefficients) else {
        return Err(Diagnostic::IrregularStoichiometry {
            reaction: reaction.id.clone(),
        });
    };

    // None when the scaled counts do not fit the atom counter
    let participant = |compound: &Compound, coefficient: f64| -> Option<Participant> {
        let multiplier = (coefficient * scale as f64).round();
        if multiplier > u32::MAX as f64 {
            return None;
        }
        let formula = network.formula(compound)?.scaled(multiplier as u32)?;
        Some(Participant {
            compound: compound.clone(),
            formula,
        })
    };
    let overflow = || Diagnostic::AtomCountOverflow {
        reaction: reaction.id.clone(),
    };
    let reactants: Vec<Participant> = reaction
        .reactants()
        .map(|(compound, coefficient)| participant(compound, coefficient))
        .collect::<Option<_>>()
        .ok_or_else(overflow)?;
    let products: Vec<Participant> = reaction
        .products()
        .map(|(compound, coefficient)| participant(compound, coefficient))
        .collect::<Option<_>>()
        .ok_or_else(overflow)?;
    if reactants.is_empty() || products.is_empty() {
        return Err(Diagnostic::NoCounterpart {
            reaction: reaction.id.clone(),
        });
    }
    Ok(PreparedReaction {
        id: reaction.id.clone(),
        reactants,
        products,
        scale,
    })
}

/// Prepares every non-excluded reaction of the network, in network order. Skipped
/// reactions are returned as diagnostics; excluded ones leave no trace.
pub fn prepare_network(
    network: &Network,
    excluded: &HashSet<String>,
) -> (Vec<PreparedReaction>, Vec<Diagnostic>) {
    let mut prepared = Vec::new();
    let mut diagnostics = Vec::new();
    for reaction in network.reactions() {
        if excluded.contains(&reaction.id) {
            continue;
        }
        match prepare_reaction(reaction, network) {
            Ok(reaction) => prepared.push(reaction),
            Err(diagnostic) => {
                diagnostic.log();
                diagnostics.push(diagnostic);
            }
        }
    }
    (prepared, diagnostics)
}

/// Element-weighted similarity `S(r,p) = Σ w(e)·min(n_r(e), n_p(e))`.
pub fn pair_similarity(reactant: &Formula, product: &Formula, weights: &ElementWeights) -> f64 {
    reactant.shared_weight(product, weights, 0.0)
}

/// Transfer variable: pair index and element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TransferVariable {
    pair: usize,
    element: usize,
}

/// The transport problem of one reaction. Built fresh for every solve and dropped
/// afterwards.
#[derive(Debug, Clone)]
pub struct TransportProblem {
    pub reaction: String,
    pub pairs: Vec<(usize, usize)>,
    /// balanced elements, the ones the problem routes
    pub elements: Vec<String>,
    variables: Vec<TransferVariable>,
    primary: LpProblem,
}

impl TransportProblem {
    /// Builds the problem and the diagnostics of the elements left out.
    pub fn formulate(
        reaction: &PreparedReaction,
        weights: &ElementWeights,
    ) -> (Self, Vec<Diagnostic>) {
        let pairs = reaction.pairs();
        let mut diagnostics = Vec::new();
        let mut elements = Vec::new();
        for element in reaction.elements() {
            let reactant_atoms = reaction.reactant_total(&element);
            let product_atoms = reaction.product_total(&element);
            if reactant_atoms == product_atoms {
                elements.push(element);
            } else {
                diagnostics.push(Diagnostic::ElementImbalance {
                    reaction: reaction.id.clone(),
                    element,
                    reactant_atoms,
                    product_atoms,
                });
            }
        }

        let similarity: Vec<f64> = pairs
            .iter()
            .map(|&(r, p)| {
                pair_similarity(
                    &reaction.reactants[r].formula,
                    &reaction.products[p].formula,
                    weights,
                )
            })
            .collect();

        let mut primary = LpProblem::new(Sense::Maximize);
        let mut variables = Vec::new();
        // row terms of each reactant and product, per element
        let mut reactant_rows = vec![vec![Vec::new(); elements.len()]; reaction.reactants.len()];
        let mut product_rows = vec![vec![Vec::new(); elements.len()]; reaction.products.len()];
        for (e, element) in elements.iter().enumerate() {
            let weight = weights.get(element) + WEIGHT_FLOOR;
            for (k, &(r, p)) in pairs.iter().enumerate() {
                let n_r = reaction.reactants[r].formula.count(element);
                let n_p = reaction.products[p].formula.count(element);
                if n_r == 0 || n_p == 0 {
                    continue;
                }
                let index = primary.add_variable(0.0, n_r.min(n_p) as f64, false);
                variables.push(TransferVariable {
                    pair: k,
                    element: e,
                });
                primary
                    .objective
                    .push((index, weight * (1.0 + similarity[k])));
                reactant_rows[r][e].push((index, 1.0));
                product_rows[p][e].push((index, 1.0));
            }
        }
        for (e, element) in elements.iter().enumerate() {
            for (r, reactant) in reaction.reactants.iter().enumerate() {
                let atoms = reactant.formula.count(element);
                if atoms > 0 {
                    primary.add_constraint(
                        std::mem::take(&mut reactant_rows[r][e]),
                        Relation::Eq,
                        atoms as f64,
                    );
                }
            }
            for (p, product) in reaction.products.iter().enumerate() {
                let atoms = product.formula.count(element);
                if atoms > 0 {
                    primary.add_constraint(
                        std::mem::take(&mut product_rows[p][e]),
                        Relation::Eq,
                        atoms as f64,
                    );
                }
            }
        }

        let problem = Self {
            reaction: reaction.id.clone(),
            pairs,
            elements,
            variables,
            primary,
        };
        (problem, diagnostics)
    }

    pub fn primary(&self) -> &LpProblem {
        &self.primary
    }

    /// no transfer variable at all (nothing balanced to route)
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Solves the primary problem and returns its optimal value. The optimal vertex is
    /// integral, so the value is taken at the rounded solution when that is lower: the
    /// face constraint then compares the same integral points on both solves.
    pub fn solve_primary(&self, solver: &dyn LpSolver) -> Result<f64, PairsError> {
        if self.is_empty() {
            return Ok(0.0);
        }
        match solver.solve(&self.primary)? {
            LpOutcome::Optimal { objective, values } => {
                let rounded: Vec<f64> = values.iter().map(|v| v.round()).collect();
                Ok(objective.min(self.primary.objective_value(&rounded)))
            }
            other => Err(self.status_error(&other)),
        }
    }

    /// Integer problem over the optimal face (primary objective ≥ `optimum` minus
    /// [`FACE_TOLERANCE`]) maximizing `Σ preference[pair]·x`.
    pub fn tie_break(&self, optimum: f64, preference: &[f64]) -> LpProblem {
        let mut problem = self.primary.clone();
        for variable in problem.variables.iter_mut() {
            variable.integer = true;
        }
        let face = self.primary.objective.clone();
        problem.add_constraint(
            face,
            Relation::Geq,
            optimum - FACE_TOLERANCE,
        );
        problem.objective = self
            .variables
            .iter()
            .enumerate()
            .map(|(index, v)| (index, preference[v.pair]))
            .collect();
        problem
    }

    /// Solves a tie-break problem and returns its integral assignment.
    pub fn solve_tie_break(
        &self,
        reaction: &PreparedReaction,
        optimum: f64,
        preference: &[f64],
        solver: &dyn LpSolver,
    ) -> Result<Vec<Formula>, PairsError> {
        if self.is_empty() {
            return Ok(vec![Formula::new(); self.pairs.len()]);
        }
        match solver.solve(&self.tie_break(optimum, preference))? {
            LpOutcome::Optimal { values, .. } => self.assignment(reaction, &values),
            other => Err(self.status_error(&other)),
        }
    }

    /// Assignment of a reaction with a single reactant or a single product: every atom
    /// has only one place to go.
    pub fn forced_assignment(&self, reaction: &PreparedReaction) -> Option<Vec<Formula>> {
        let single_reactant = reaction.reactants.len() == 1;
        let single_product = reaction.products.len() == 1;
        if !single_reactant && !single_product {
            return None;
        }
        let assignment = self
            .pairs
            .iter()
            .map(|&(r, p)| {
                let source = if single_reactant {
                    &reaction.products[p].formula
                } else {
                    &reaction.reactants[r].formula
                };
                Formula::from_counts(self.elements.iter().map(|e| (e.as_str(), source.count(e))))
            })
            .collect();
        Some(assignment)
    }

    /// Rounds solver values to atom counts per pair and checks that they still
    /// conserve every routed element on both sides.
    pub fn assignment(
        &self,
        reaction: &PreparedReaction,
        values: &[f64],
    ) -> Result<Vec<Formula>, PairsError> {
        let mut assignment = vec![Formula::new(); self.pairs.len()];
        for (index, variable) in self.variables.iter().enumerate() {
            let value = values.get(index).copied().unwrap_or(0.0).round().max(0.0) as u32;
            assignment[variable.pair].add_atoms(&self.elements[variable.element], value);
        }
        self.check_conservation(reaction, &assignment)?;
        Ok(assignment)
    }

    pub fn check_conservation(
        &self,
        reaction: &PreparedReaction,
        assignment: &[Formula],
    ) -> Result<(), PairsError> {
        for element in &self.elements {
            let mut from_reactants = vec![0u64; reaction.reactants.len()];
            let mut to_products = vec![0u64; reaction.products.len()];
            for (k, &(r, p)) in self.pairs.iter().enumerate() {
                let atoms = u64::from(assignment[k].count(element));
                from_reactants[r] += atoms;
                to_products[p] += atoms;
            }
            let reactants_ok = reaction
                .reactants
                .iter()
                .zip(&from_reactants)
                .all(|(participant, &atoms)| u64::from(participant.formula.count(element)) == atoms);
            let products_ok = reaction
                .products
                .iter()
                .zip(&to_products)
                .all(|(participant, &atoms)| u64::from(participant.formula.count(element)) == atoms);
            if !reactants_ok || !products_ok {
                return Err(PairsError::RoundingMismatch {
                    reaction: self.reaction.clone(),
                    element: element.clone(),
                });
            }
        }
        Ok(())
    }

    fn status_error(&self, outcome: &LpOutcome) -> PairsError {
        let status = match outcome {
            LpOutcome::Infeasible => "infeasible",
            LpOutcome::Unbounded => "unbounded",
            LpOutcome::Optimal { .. } => "optimal",
        };
        PairsError::SolverStatus {
            reaction: self.reaction.clone(),
            status: status.to_string(),
        }
    }
}
