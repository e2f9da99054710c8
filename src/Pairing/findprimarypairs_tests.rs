/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Chemistry::element_weights::ElementWeights;
    use crate::Chemistry::formula::Formula;
    use crate::Network::model::{Compound, Direction, Network, Reaction};
    use crate::Pairing::findprimarypairs::{ConfirmedIndex, FindPrimaryPairs};
    use crate::Pairing::lp_service::{LpOutcome, LpProblem, LpSolver, MicroLpSolver};
    use crate::Pairing::mapmaker::Mapmaker;
    use crate::Pairing::predictor::PairPredictor;
    use crate::Pairing::report::{Diagnostic, PredictionOutcome, filter_by_element};
    use crate::Pairing::transport_lp::{TransportProblem, prepare_reaction};
    use crate::errors::PairsError;
    use std::collections::HashSet;

    fn fpp(max_rounds: usize) -> FindPrimaryPairs {
        FindPrimaryPairs::new(Box::new(MicroLpSolver::new()), max_rounds)
    }

    fn reaction(id: &str, reactants: &[&str], products: &[&str]) -> Reaction {
        let mut compounds: Vec<(Compound, f64)> = reactants
            .iter()
            .map(|id| (Compound::in_compartment(id, "c"), -1.0))
            .collect();
        compounds.extend(
            products
                .iter()
                .map(|id| (Compound::in_compartment(id, "c"), 1.0)),
        );
        Reaction::new(id, Direction::Both, compounds)
    }

    fn acetate_kinase_network() -> Network {
        Network::new()
            .with_formula("atp", "C10H12N5O13P3")
            .and_then(|n| n.with_formula("ac", "C2H3O2"))
            .and_then(|n| n.with_formula("adp", "C10H12N5O10P2"))
            .and_then(|n| n.with_formula("actp", "C2H3O5P"))
            .unwrap()
            .with_reaction(reaction("ACKr", &["atp", "ac"], &["adp", "actp"]))
    }

    /// four compounds of identical formula: the transport optimum is fully degenerate
    fn degenerate_network() -> Network {
        Network::new()
            .with_formula("a", "C2H6")
            .and_then(|n| n.with_formula("b", "C2H6"))
            .and_then(|n| n.with_formula("c", "C2H6"))
            .and_then(|n| n.with_formula("d", "C2H6"))
            .unwrap()
            .with_reaction(reaction("R_amb", &["a", "b"], &["c", "d"]))
    }

    fn transfer_of(outcome: &PredictionOutcome, reactant: &str, product: &str) -> Option<Formula> {
        outcome
            .pairs
            .iter()
            .find(|p| p.reactant.id == reactant && p.product.id == product)
            .map(|p| p.transfer.clone())
    }

    fn assert_conserved(network: &Network, outcome: &PredictionOutcome) {
        for reaction in network.reactions() {
            let Ok(prepared) = prepare_reaction(reaction, network) else {
                continue;
            };
            let (problem, _) = TransportProblem::formulate(&prepared, &ElementWeights::default());
            for element in &problem.elements {
                for participant in &prepared.reactants {
                    let sent: u32 = outcome
                        .pairs_of(&reaction.id)
                        .filter(|p| p.reactant == participant.compound)
                        .map(|p| p.transfer.count(element))
                        .sum();
                    assert_eq!(sent, participant.formula.count(element), "{} {}", reaction.id, element);
                }
                for participant in &prepared.products {
                    let received: u32 = outcome
                        .pairs_of(&reaction.id)
                        .filter(|p| p.product == participant.compound)
                        .map(|p| p.transfer.count(element))
                        .sum();
                    assert_eq!(received, participant.formula.count(element), "{} {}", reaction.id, element);
                }
            }
        }
    }

    #[test]
    fn test_acetate_kinase_scenario() {
        let network = acetate_kinase_network();
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.failures.is_empty());
        assert!(outcome.ambiguous.is_empty());
        assert!(outcome.diagnostics.is_empty());

        let atp_adp = transfer_of(&outcome, "atp", "adp").unwrap();
        assert_eq!(atp_adp.to_string(), "C10H12N5O10P2");
        // phosphate group only
        let atp_actp = transfer_of(&outcome, "atp", "actp").unwrap();
        assert_eq!(atp_actp.to_string(), "O3P");
        assert_eq!(atp_actp.count("C"), 0);
        let ac_actp = transfer_of(&outcome, "ac", "actp").unwrap();
        assert_eq!(ac_actp.count("C"), 2);
        assert!(transfer_of(&outcome, "ac", "adp").is_none());

        assert_eq!(outcome.pairs.len(), 3);
        assert_eq!(outcome.pairs[0].reactant.to_string(), "atp[c]");
        assert_eq!(outcome.rounds.len(), 1);
        assert_eq!(outcome.rounds[0].resolved, 1);
        assert_eq!(outcome.rounds[0].outstanding, 0);
    }

    #[test]
    fn test_report_element_after_prediction() {
        let outcome = fpp(10)
            .predict(&acetate_kinase_network(), &ElementWeights::default(), &HashSet::new())
            .unwrap();
        let carbon = filter_by_element(&outcome.pairs, Some("C"));
        let shown: Vec<String> = carbon
            .iter()
            .map(|p| format!("{}>{} {}", p.reactant.id, p.product.id, p.transfer))
            .collect();
        assert_eq!(shown, vec!["atp>adp C10", "ac>actp C2"]);
    }

    #[test]
    fn test_conservation_on_small_network() {
        let network = Network::new()
            .with_formula("glc", "C6H12O6")
            .and_then(|n| n.with_formula("atp", "C10H12N5O13P3"))
            .and_then(|n| n.with_formula("g6p", "C6H11O9P"))
            .and_then(|n| n.with_formula("adp", "C10H12N5O10P2"))
            .and_then(|n| n.with_formula("h", "H"))
            .and_then(|n| n.with_formula("f6p", "C6H11O9P"))
            .and_then(|n| n.with_formula("nad", "C21H26N7O14P2"))
            .and_then(|n| n.with_formula("nadh", "C21H27N7O14P2"))
            .and_then(|n| n.with_formula("lac", "C3H5O3"))
            .and_then(|n| n.with_formula("pyr", "C3H3O3"))
            .unwrap()
            .with_reaction(reaction("HEX1", &["atp", "glc"], &["adp", "g6p", "h"]))
            .with_reaction(reaction("PGI", &["g6p"], &["f6p"]))
            .with_reaction(reaction("LDH", &["lac", "nad"], &["pyr", "nadh", "h"]));
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.failures.is_empty());
        assert_conserved(&network, &outcome);
        assert_eq!(transfer_of(&outcome, "lac", "pyr").unwrap().count("C"), 3);
        assert_eq!(transfer_of(&outcome, "nad", "nadh").unwrap().count("C"), 21);
        for pair in &outcome.pairs {
            assert!(!pair.transfer.is_empty());
        }
    }

    #[test]
    fn test_excluded_reactions_produce_nothing() {
        let network = acetate_kinase_network();
        let excluded: HashSet<String> = ["ACKr".to_string()].into_iter().collect();
        for weights in [ElementWeights::default(), "C=0.1,*=1".parse().unwrap()] {
            let outcome = fpp(10).predict(&network, &weights, &excluded).unwrap();
            assert_eq!(outcome.pairs_of("ACKr").count(), 0);
            assert!(outcome.diagnostics.is_empty());
            let outcome = Mapmaker::new().predict(&network, &weights, &excluded).unwrap();
            assert_eq!(outcome.pairs_of("ACKr").count(), 0);
        }
    }

    #[test]
    fn test_weight_monotonicity() {
        let network = acetate_kinase_network();
        let prepared = prepare_reaction(&network.reactions()[0], &network).unwrap();
        let solver = MicroLpSolver::new();
        let mut previous = f64::NEG_INFINITY;
        for weight in [0.0, 0.2, 0.5, 0.82, 1.0] {
            let weights = ElementWeights::default().with("O", weight).unwrap();
            let (problem, _) = TransportProblem::formulate(&prepared, &weights);
            let optimum = problem.solve_primary(&solver).unwrap();
            assert!(
                optimum >= previous - 1e-6,
                "optimum {} fell below {} at O={}",
                optimum,
                previous,
                weight
            );
            previous = optimum;
        }
    }

    #[test]
    fn test_persistent_ambiguity_is_reported() {
        let network = degenerate_network();
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert_eq!(outcome.ambiguous, vec!["R_amb".to_string()]);
        // round 2 changes nothing and ends the run
        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.rounds[1].outstanding, 1);
        // reported with the discovery-order assignment
        assert_eq!(transfer_of(&outcome, "a", "c").unwrap().to_string(), "C2H6");
        assert_eq!(transfer_of(&outcome, "b", "d").unwrap().to_string(), "C2H6");
        assert!(transfer_of(&outcome, "a", "d").is_none());
        assert_conserved(&network, &outcome);
    }

    #[test]
    fn test_confirmed_pairs_resolve_ambiguity() {
        // a -> c alone is forced and confirms the pair for R_amb
        let network = degenerate_network().with_reaction(reaction("R_hint", &["a"], &["c"]));
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.ambiguous.is_empty());
        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.rounds[0].outstanding, 1);
        assert_eq!(outcome.rounds[1].resolved, 1);
        assert_eq!(outcome.rounds[1].outstanding, 0);
        let r_amb: Vec<(String, String)> = outcome
            .pairs_of("R_amb")
            .map(|p| (p.reactant.id.clone(), p.product.id.clone()))
            .collect();
        assert_eq!(
            r_amb,
            vec![
                ("a".to_string(), "c".to_string()),
                ("b".to_string(), "d".to_string())
            ]
        );
    }

    #[test]
    fn test_hint_for_the_other_diagonal() {
        let network = degenerate_network().with_reaction(reaction("R_hint", &["b"], &["c"]));
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.ambiguous.is_empty());
        assert!(transfer_of(&outcome, "b", "c").is_some());
        assert!(transfer_of(&outcome, "a", "d").is_some());
        assert!(
            outcome
                .pairs_of("R_amb")
                .all(|p| !(p.reactant.id == "a" && p.product.id == "c"))
        );
    }

    #[test]
    fn test_round_limit_leaves_reactions_ambiguous() {
        let network = degenerate_network().with_reaction(reaction("R_hint", &["a"], &["c"]));
        let outcome = fpp(1)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert_eq!(outcome.rounds.len(), 1);
        assert_eq!(outcome.ambiguous, vec!["R_amb".to_string()]);
        assert_eq!(outcome.pairs_of("R_amb").count(), 2);
    }

    /// R_hint confirms a-c, which settles R1 in round 2, whose b-d settles R2 in round 3
    fn propagation_chain() -> Network {
        Network::new()
            .with_formula("a", "C2H6")
            .and_then(|n| n.with_formula("b", "C2H6"))
            .and_then(|n| n.with_formula("c", "C2H6"))
            .and_then(|n| n.with_formula("d", "C2H6"))
            .and_then(|n| n.with_formula("e", "C2H6"))
            .and_then(|n| n.with_formula("f", "C2H6"))
            .unwrap()
            .with_reaction(reaction("R_hint", &["a"], &["c"]))
            .with_reaction(reaction("R1", &["a", "b"], &["c", "d"]))
            .with_reaction(reaction("R2", &["b", "e"], &["f", "d"]))
    }

    #[test]
    fn test_propagation_across_rounds() {
        let network = propagation_chain();
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.ambiguous.is_empty());
        assert!(outcome.failures.is_empty());
        let progress: Vec<(usize, usize, usize)> = outcome
            .rounds
            .iter()
            .map(|r| (r.processed, r.resolved, r.outstanding))
            .collect();
        assert_eq!(progress, vec![(3, 1, 2), (2, 1, 1), (1, 1, 0)]);
        for pair in outcome.rounds.windows(2) {
            assert!(pair[1].outstanding <= pair[0].outstanding);
        }
        assert!(transfer_of(&outcome, "b", "d").is_some());
        assert!(transfer_of(&outcome, "e", "f").is_some());
        assert!(transfer_of(&outcome, "b", "f").is_none());
        assert_conserved(&network, &outcome);
    }

    #[test]
    fn test_round_limit_stops_propagation_chain() {
        let outcome = fpp(2)
            .predict(&propagation_chain(), &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert_eq!(outcome.rounds.len(), 2);
        assert_eq!(outcome.rounds[1].outstanding, 1);
        assert_eq!(outcome.ambiguous, vec!["R2".to_string()]);
        assert_eq!(outcome.pairs_of("R2").count(), 2);
    }

    #[test]
    fn test_oversized_stoichiometry_is_skipped() {
        let network = acetate_kinase_network()
            .with_formula("big_a", "C1000")
            .and_then(|n| n.with_formula("big_b", "C1000"))
            .unwrap()
            .with_reaction(Reaction::new(
                "R_big",
                Direction::Forward,
                vec![
                    (Compound::new("big_a"), -5e6),
                    (Compound::new("big_b"), 5e6),
                ],
            ));
        let weights = ElementWeights::default();
        let outcomes = [
            fpp(10).predict(&network, &weights, &HashSet::new()).unwrap(),
            Mapmaker::new().predict(&network, &weights, &HashSet::new()).unwrap(),
        ];
        for outcome in outcomes {
            assert_eq!(
                outcome.diagnostics,
                vec![Diagnostic::AtomCountOverflow {
                    reaction: "R_big".to_string()
                }]
            );
            assert_eq!(outcome.pairs_of("R_big").count(), 0);
            assert_eq!(outcome.pairs_of("ACKr").count(), 3);
        }
    }

    #[test]
    fn test_large_reaction_is_resolved() {
        let network = Network::new()
            .with_formula("a", "C2000H")
            .and_then(|n| n.with_formula("b", "HN"))
            .and_then(|n| n.with_formula("p", "C2000H"))
            .and_then(|n| n.with_formula("q", "HN"))
            .unwrap()
            .with_reaction(reaction("R_large", &["a", "b"], &["p", "q"]));
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(outcome.failures.is_empty());
        assert!(outcome.ambiguous.is_empty());
        assert_eq!(transfer_of(&outcome, "a", "p").unwrap().to_string(), "C2000H");
        assert_eq!(transfer_of(&outcome, "b", "q").unwrap().to_string(), "HN");
    }

    #[test]
    fn test_confirmed_index_is_unordered() {
        let mut index = ConfirmedIndex::new();
        assert!(index.is_empty());
        index.insert("atp", "adp");
        index.insert("adp", "atp");
        assert_eq!(index.len(), 1);
        assert!(index.contains("adp", "atp"));
        assert!(!index.contains("atp", "actp"));
    }

    #[test]
    fn test_diagnostics_do_not_stop_the_run() {
        let network = acetate_kinase_network()
            .with_reaction(reaction("R_nof", &["atp", "x"], &["adp", "y"]))
            .with_reaction(Reaction::new(
                "EX_ac",
                Direction::Both,
                vec![(Compound::in_compartment("ac", "e"), -1.0)],
            ));
        let outcome = fpp(10)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        let skipped: Vec<&str> = outcome.diagnostics.iter().map(|d| d.reaction()).collect();
        assert_eq!(skipped, vec!["R_nof", "EX_ac"]);
        assert_eq!(outcome.pairs_of("ACKr").count(), 3);
    }

    enum Script {
        Infeasible,
        Backend,
        Constant(f64),
    }

    /// LP service answering every problem the same way
    struct ScriptedSolver(Script);

    impl LpSolver for ScriptedSolver {
        fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, PairsError> {
            match self.0 {
                Script::Infeasible => Ok(LpOutcome::Infeasible),
                Script::Backend => Err(PairsError::SolverBackend("unavailable".to_string())),
                Script::Constant(value) => Ok(LpOutcome::Optimal {
                    objective: 0.0,
                    values: vec![value; problem.variables.len()],
                }),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn scripted(script: Script) -> FindPrimaryPairs {
        FindPrimaryPairs::new(Box::new(ScriptedSolver(script)), 10)
    }

    #[test]
    fn test_solver_failures_are_isolated() {
        let network = degenerate_network().with_reaction(reaction("R_hint", &["a"], &["c"]));
        for script in [Script::Infeasible, Script::Backend] {
            let outcome = scripted(script)
                .predict(&network, &ElementWeights::default(), &HashSet::new())
                .unwrap();
            assert_eq!(outcome.failures.len(), 1);
            assert_eq!(outcome.failures[0].0, "R_amb");
            assert_eq!(outcome.pairs_of("R_amb").count(), 0);
            // the forced reaction never reaches the solver
            assert_eq!(outcome.pairs_of("R_hint").count(), 1);
        }
        let outcome = scripted(Script::Infeasible)
            .predict(&network, &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(matches!(
            &outcome.failures[0].1,
            PairsError::SolverStatus { status, .. } if status == "infeasible"
        ));
    }

    #[test]
    fn test_rounding_mismatch_is_a_failure() {
        let outcome = scripted(Script::Constant(0.4))
            .predict(&degenerate_network(), &ElementWeights::default(), &HashSet::new())
            .unwrap();
        assert!(matches!(
            &outcome.failures[0].1,
            PairsError::RoundingMismatch { reaction, .. } if reaction == "R_amb"
        ));
        assert!(outcome.pairs.is_empty());
        // failed reactions are not retried
        assert_eq!(outcome.rounds.len(), 1);
    }
}
