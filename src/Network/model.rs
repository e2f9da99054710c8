use crate::Chemistry::formula::Formula;
use crate::errors::PairsError;
use std::collections::HashMap;
use std::fmt;

/// A compound in a compartment, as it participates in a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Compound {
    pub id: String,
    pub compartment: Option<String>,
}

impl Compound {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            compartment: None,
        }
    }

    pub fn in_compartment(id: &str, compartment: &str) -> Self {
        Self {
            id: id.to_string(),
            compartment: Some(compartment.to_string()),
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.compartment {
            Some(compartment) => write!(f, "{}[{}]", self.id, compartment),
            None => write!(f, "{}", self.id),
        }
    }
}

/// compound table entry
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundEntry {
    pub id: String,
    pub name: Option<String>,
    pub formula: Option<Formula>,
}

impl CompoundEntry {
    pub fn new(id: &str, formula: Option<Formula>) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            formula,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// left to right only
    Forward,
    Both,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub direction: Direction,
    /// (compound, coefficient): negative for reactants, positive for products
    pub compounds: Vec<(Compound, f64)>,
}

impl Reaction {
    pub fn new(id: &str, direction: Direction, compounds: Vec<(Compound, f64)>) -> Self {
        Self {
            id: id.to_string(),
            direction,
            compounds,
        }
    }

    pub fn is_reversible(&self) -> bool {
        self.direction == Direction::Both
    }

    /// reactants with their (positive) stoichiometric coefficients, in declared order
    pub fn reactants(&self) -> impl Iterator<Item = (&Compound, f64)> {
        self.compounds
            .iter()
            .filter(|(_, coef)| *coef < 0.0)
            .map(|(compound, coef)| (compound, -coef))
    }

    pub fn products(&self) -> impl Iterator<Item = (&Compound, f64)> {
        self.compounds
            .iter()
            .filter(|(_, coef)| *coef > 0.0)
            .map(|(compound, coef)| (compound, *coef))
    }
}

/// Compounds and reactions of a metabolic model, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct Network {
    compounds: HashMap<String, CompoundEntry>,
    reactions: Vec<Reaction>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compound(&mut self, entry: CompoundEntry) {
        self.compounds.insert(entry.id.clone(), entry);
    }

    pub fn add_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    pub fn with_formula(mut self, id: &str, formula: &str) -> Result<Self, PairsError> {
        self.add_compound(CompoundEntry::new(id, Some(formula.parse()?)));
        Ok(self)
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.add_reaction(reaction);
        self
    }

    /// formula of the compound, regardless of compartment
    pub fn formula(&self, compound: &Compound) -> Option<&Formula> {
        self.compounds
            .get(&compound.id)
            .and_then(|entry| entry.formula.as_ref())
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn compound_count(&self) -> usize {
        self.compounds.len()
    }
}
