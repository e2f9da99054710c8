//! # LP Solving Service
//!
//! ## Purpose
//! The pairing engines describe their optimization problems as plain data
//! ([`LpProblem`]) and hand them to an [`LpSolver`]. Any backend able to answer
//! "optimal assignment, infeasible or unbounded" for such a problem can be plugged in.
//!
//! ## Backends
//! - [`MicroLpSolver`]: pure Rust simplex with branch and bound (through `good_lp`'s
//!   `microlp` backend). Stateless: every call builds and drops its own model, so one
//!   instance can serve any number of solves.

use crate::errors::PairsError;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    default_solver, variable,
};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Leq,
    Geq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpVariable {
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
}

/// Σ coef·x[index] (relation) rhs
#[derive(Debug, Clone, PartialEq)]
pub struct LpConstraint {
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    pub variables: Vec<LpVariable>,
    pub constraints: Vec<LpConstraint>,
    /// sparse objective, (variable index, coefficient)
    pub objective: Vec<(usize, f64)>,
    pub sense: Sense,
}

impl LpProblem {
    pub fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Vec::new(),
            sense,
        }
    }

    /// adds a bounded variable and returns its index
    pub fn add_variable(&mut self, lower: f64, upper: f64, integer: bool) -> usize {
        self.variables.push(LpVariable {
            lower,
            upper,
            integer,
        });
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(LpConstraint {
            terms,
            relation,
            rhs,
        });
    }

    /// value of the objective for an assignment
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .map(|&(index, coef)| coef * values.get(index).copied().unwrap_or(0.0))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
    Unbounded,
}

/// Abstract LP/MILP solving service.
pub trait LpSolver {
    /// Returns `Err` only when the backend itself fails; infeasible and unbounded
    /// problems are ordinary outcomes.
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, PairsError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        MicroLpSolver
    }
}

impl LpSolver for MicroLpSolver {
    fn solve(&self, problem: &LpProblem) -> Result<LpOutcome, PairsError> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = problem
            .variables
            .iter()
            .map(|v| {
                let definition = variable().min(v.lower).max(v.upper);
                if v.integer {
                    vars.add(definition.integer())
                } else {
                    vars.add(definition)
                }
            })
            .collect();

        let linear = |terms: &[(usize, f64)]| {
            let mut expression = Expression::with_capacity(terms.len());
            for &(index, coef) in terms {
                expression.add_mul(coef, handles[index]);
            }
            expression
        };

        let objective = linear(&problem.objective);
        let unsolved = match problem.sense {
            Sense::Maximize => vars.maximise(objective),
            Sense::Minimize => vars.minimise(objective),
        };
        let mut model = unsolved.using(default_solver);
        for constraint in &problem.constraints {
            let expression = linear(&constraint.terms);
            model = model.with(match constraint.relation {
                Relation::Eq => expression.eq(constraint.rhs),
                Relation::Leq => expression.leq(constraint.rhs),
                Relation::Geq => expression.geq(constraint.rhs),
            });
        }

        debug!(
            "solving LP with {} variables and {} constraints",
            problem.variables.len(),
            problem.constraints.len()
        );
        match model.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
                let objective = problem.objective_value(&values);
                Ok(LpOutcome::Optimal { objective, values })
            }
            Err(ResolutionError::Infeasible) => Ok(LpOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(LpOutcome::Unbounded),
            Err(e) => Err(PairsError::SolverBackend(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "microlp"
    }
}
