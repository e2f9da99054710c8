/// Abstract LP/MILP solving service and its `good_lp` (microlp) backend.
///
/// Problems are plain data: bounded variables, linear constraints and a linear
/// objective. Any [`lp_service::LpSolver`] can answer them.
///
///  # Examples
/// ```
/// use PrimaryPairs::Pairing::lp_service::{LpOutcome, LpProblem, LpSolver, MicroLpSolver, Relation, Sense};
/// let mut problem = LpProblem::new(Sense::Maximize);
/// let x = problem.add_variable(0.0, 4.0, false);
/// let y = problem.add_variable(0.0, 4.0, false);
/// problem.add_constraint(vec![(x, 1.0), (y, 1.0)], Relation::Eq, 4.0);
/// problem.objective = vec![(x, 2.0), (y, 1.0)];
/// match MicroLpSolver::new().solve(&problem).unwrap() {
///     LpOutcome::Optimal { objective, .. } => assert!((objective - 8.0).abs() < 1e-6),
///     other => panic!("{:?}", other),
/// }
/// ```
pub mod lp_service;
/// Preparation of reactions (formulas, integral coefficients) and the per-reaction
/// transport problem over transferred atoms.
pub mod transport_lp;
/// Iterative LP-based predictor with cross-reaction propagation of confirmed pairs.
///
///  # Examples
/// ```
/// use PrimaryPairs::Chemistry::element_weights::ElementWeights;
/// use PrimaryPairs::Network::model::{Compound, Direction, Network, Reaction};
/// use PrimaryPairs::Pairing::findprimarypairs::FindPrimaryPairs;
/// use PrimaryPairs::Pairing::lp_service::MicroLpSolver;
/// use PrimaryPairs::Pairing::predictor::PairPredictor;
/// use std::collections::HashSet;
/// let network = Network::new()
///     .with_formula("g6p", "C6H11O9P").unwrap()
///     .with_formula("h2o", "H2O").unwrap()
///     .with_formula("glc", "C6H12O6").unwrap()
///     .with_formula("pi", "HO4P").unwrap()
///     .with_reaction(Reaction::new(
///         "G6PP",
///         Direction::Forward,
///         vec![
///             (Compound::new("g6p"), -1.0),
///             (Compound::new("h2o"), -1.0),
///             (Compound::new("glc"), 1.0),
///             (Compound::new("pi"), 1.0),
///         ],
///     ));
/// let fpp = FindPrimaryPairs::new(Box::new(MicroLpSolver::new()), 10);
/// let outcome = fpp.predict(&network, &ElementWeights::default(), &HashSet::new()).unwrap();
/// let first = &outcome.pairs[0];
/// assert_eq!((first.reactant.id.as_str(), first.product.id.as_str()), ("g6p", "glc"));
/// assert_eq!(first.transfer.count("C"), 6);
/// ```
pub mod findprimarypairs;
/// Greedy similarity-based predictor, no solver involved.
pub mod mapmaker;
/// Common capability of the predictors and the tagged choice between them.
pub mod predictor;
/// Pair results, per reaction diagnostics, the element filter and output formatting.
pub mod report;
#[cfg(test)]
mod findprimarypairs_tests;
