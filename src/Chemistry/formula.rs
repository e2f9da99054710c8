use crate::Chemistry::element_weights::ElementWeights;
use crate::errors::PairsError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// symbols of the periodic table; anything else in a formula is a variable group
const ELEMENTS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
    "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd",
    "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os",
    "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa",
    "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg",
    "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// true if the symbol names an element of the periodic table
pub fn is_element(symbol: &str) -> bool {
    ELEMENTS.contains(&symbol)
}

/// true if the symbol is a placeholder for an unresolved substructure
pub fn is_variable_group(symbol: &str) -> bool {
    !symbol.is_empty() && !is_element(symbol)
}

/// Elemental composition of a compound (or of the atoms transferred between two
/// compounds). Zero counts are never stored, so two formulas with the same atoms
/// always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Formula {
    atoms: BTreeMap<String, u32>,
}

impl Formula {
    pub fn new() -> Self {
        Self {
            atoms: BTreeMap::new(),
        }
    }

    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut formula = Self::new();
        for (symbol, count) in counts {
            let symbol: String = symbol.into();
            formula.add_atoms(&symbol, count);
        }
        formula
    }

    /// Parses formulas like `C6H12O6`, `Ca(NO3)2` or `C2H3OR`.
    pub fn parse(text: &str) -> Result<Self, PairsError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Err(formula_error(text, "empty formula"));
        }
        let mut pos = 0;
        let atoms = parse_group(&chars, &mut pos, 0, text)?;
        if pos < chars.len() {
            return Err(formula_error(text, "unmatched ')'"));
        }
        Ok(Self { atoms })
    }

    pub fn count(&self, symbol: &str) -> u32 {
        self.atoms.get(symbol).copied().unwrap_or(0)
    }

    /// symbols with nonzero count, variable groups included
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.atoms.keys().map(|s| s.as_str())
    }

    pub fn element_set(&self) -> BTreeSet<String> {
        self.atoms.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.atoms.iter().map(|(s, &n)| (s.as_str(), n))
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn has_variable_groups(&self) -> bool {
        self.atoms.keys().any(|s| is_variable_group(s))
    }

    /// Adds atoms of one symbol; the count saturates at `u32::MAX`.
    pub fn add_atoms(&mut self, symbol: &str, count: u32) {
        if count > 0 {
            let atoms = self.atoms.entry(symbol.to_string()).or_insert(0);
            *atoms = atoms.saturating_add(count);
        }
    }

    /// every count multiplied by `factor`, `None` if a count overflows
    pub fn scaled(&self, factor: u32) -> Option<Self> {
        let mut atoms = BTreeMap::new();
        for (symbol, count) in self.iter() {
            let scaled = count.checked_mul(factor)?;
            if scaled > 0 {
                atoms.insert(symbol.to_string(), scaled);
            }
        }
        Some(Self { atoms })
    }

    /// elementwise minimum of two formulas
    pub fn intersection(&self, other: &Formula) -> Self {
        Self::from_counts(self.iter().map(|(s, n)| (s, n.min(other.count(s)))))
    }

    /// elementwise difference, clamped at zero
    pub fn saturating_sub(&self, other: &Formula) -> Self {
        Self::from_counts(self.iter().map(|(s, n)| (s, n.saturating_sub(other.count(s)))))
    }

    /// the part of the formula made of one element only
    pub fn only(&self, symbol: &str) -> Self {
        Self::from_counts([(symbol, self.count(symbol))])
    }

    /// Σ (w(e) + floor)·n(e)
    pub fn weighted_size(&self, weights: &ElementWeights, floor: f64) -> f64 {
        self.iter()
            .map(|(s, n)| (weights.get(s) + floor) * n as f64)
            .sum()
    }

    /// Σ (w(e) + floor)·min(n_self(e), n_other(e)): the element-weighted similarity of
    /// two formulas. Variable groups only match when their symbols are identical.
    pub fn shared_weight(&self, other: &Formula, weights: &ElementWeights, floor: f64) -> f64 {
        self.intersection(other).weighted_size(weights, floor)
    }
}

impl FromStr for Formula {
    type Err = PairsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

/// Hill order: C, then H, then everything else alphabetically. Without carbon all
/// symbols are alphabetical.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ordered: Vec<(&str, u32)> = Vec::with_capacity(self.atoms.len());
        if self.count("C") > 0 {
            ordered.push(("C", self.count("C")));
            if self.count("H") > 0 {
                ordered.push(("H", self.count("H")));
            }
            ordered.extend(self.iter().filter(|(s, _)| *s != "C" && *s != "H"));
        } else {
            ordered.extend(self.iter());
        }
        for (symbol, count) in ordered {
            if count == 1 {
                write!(f, "{}", symbol)?;
            } else {
                write!(f, "{}{}", symbol, count)?;
            }
        }
        Ok(())
    }
}

fn formula_error(text: &str, reason: &str) -> PairsError {
    PairsError::Formula {
        formula: text.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_count(chars: &[char], pos: &mut usize, text: &str) -> Result<u32, PairsError> {
    let start = *pos;
    let mut count: u32 = 0;
    while *pos < chars.len() {
        let Some(digit) = chars[*pos].to_digit(10) else {
            break;
        };
        count = count
            .checked_mul(10)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| formula_error(text, "atom count overflows"))?;
        *pos += 1;
    }
    if *pos == start {
        return Ok(1);
    }
    if count == 0 {
        return Err(formula_error(text, "atom count must be positive"));
    }
    Ok(count)
}

fn add_checked(
    atoms: &mut BTreeMap<String, u32>,
    symbol: String,
    count: u32,
    text: &str,
) -> Result<(), PairsError> {
    let entry = atoms.entry(symbol).or_insert(0);
    *entry = entry
        .checked_add(count)
        .ok_or_else(|| formula_error(text, "atom count overflows"))?;
    Ok(())
}

// a group ends at the end of input or at the ')' that closes it (left unconsumed)
fn parse_group(
    chars: &[char],
    pos: &mut usize,
    depth: usize,
    text: &str,
) -> Result<BTreeMap<String, u32>, PairsError> {
    let mut atoms: BTreeMap<String, u32> = BTreeMap::new();
    while *pos < chars.len() {
        let c = chars[*pos];
        if c.is_ascii_uppercase() {
            let mut symbol = c.to_string();
            *pos += 1;
            if *pos < chars.len() && chars[*pos].is_ascii_lowercase() {
                symbol.push(chars[*pos]);
                *pos += 1;
            }
            let count = parse_count(chars, pos, text)?;
            add_checked(&mut atoms, symbol, count, text)?;
        } else if c == '(' {
            *pos += 1;
            let inner = parse_group(chars, pos, depth + 1, text)?;
            if *pos >= chars.len() || chars[*pos] != ')' {
                return Err(formula_error(text, "unmatched '('"));
            }
            *pos += 1;
            if inner.is_empty() {
                return Err(formula_error(text, "empty parentheses"));
            }
            let multiplier = parse_count(chars, pos, text)?;
            for (symbol, count) in inner {
                let total = count
                    .checked_mul(multiplier)
                    .ok_or_else(|| formula_error(text, "atom count overflows"))?;
                add_checked(&mut atoms, symbol, total, text)?;
            }
        } else if c == ')' {
            if depth == 0 {
                return Err(formula_error(text, "unmatched ')'"));
            }
            return Ok(atoms);
        } else if c.is_ascii_digit() {
            return Err(formula_error(text, "atom count without a symbol"));
        } else {
            return Err(formula_error(
                text,
                &format!("unexpected character '{}' at position {}", c, *pos),
            ));
        }
    }
    Ok(atoms)
}
