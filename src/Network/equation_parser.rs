use crate::Network::model::{Compound, Direction};
use crate::errors::PairsError;
use regex::Regex;
use std::sync::LazyLock;

static GLOBAL_COMPARTMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\]]+)\]\s*:\s*(.*)$").expect("valid regex"));
// arrows must stand apart from compound names
static ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(<==>|<=>|==>|=>|-->|->|<==|<=|<--|<-)(?:\s|$)").expect("valid regex")
});
static PLUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\+\s+").expect("valid regex"));
static TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\((?P<paren>[^)]+)\)\s*|(?P<bare>\d+(?:\.\d+)?)\s+)?(?:\|(?P<quoted>[^|]+)\||(?P<name>\S+?))(?:\[(?P<comp>[^\]]+)\])?$",
    )
    .expect("valid regex")
});

fn equation_error(equation: &str, reason: &str) -> PairsError {
    PairsError::Equation {
        equation: equation.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses an equation into its direction and (compound, coefficient) list: negative
/// coefficients on the left side, positive on the right, in written order. Terms with
/// a zero coefficient are dropped; repeated compounds on one side are merged.
pub fn parse_equation(equation: &str) -> Result<(Direction, Vec<(Compound, f64)>), PairsError> {
    let (global_compartment, body) = match GLOBAL_COMPARTMENT.captures(equation) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().trim().to_string()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => (None, equation),
    };

    let arrows: Vec<_> = ARROW.captures_iter(body).collect();
    if arrows.is_empty() {
        return Err(equation_error(equation, "no reaction arrow"));
    }
    if arrows.len() > 1 {
        return Err(equation_error(equation, "more than one reaction arrow"));
    }
    let Some(arrow) = arrows[0].get(1) else {
        return Err(equation_error(equation, "no reaction arrow"));
    };
    let left = &body[..arrow.start()];
    let right = &body[arrow.end()..];

    let (direction, reversed) = match arrow.as_str() {
        "<==>" | "<=>" => (Direction::Both, false),
        "==>" | "=>" | "-->" | "->" => (Direction::Forward, false),
        _ => (Direction::Forward, true),
    };
    let (left, right) = if reversed { (right, left) } else { (left, right) };

    let mut compounds = Vec::new();
    for (side, sign) in [(left, -1.0), (right, 1.0)] {
        let mut side_compounds: Vec<(Compound, f64)> = Vec::new();
        for term in parse_side(side, equation)? {
            let (compound, value) = parse_term(term, global_compartment.as_deref(), equation)?;
            if value == 0.0 {
                continue;
            }
            match side_compounds.iter_mut().find(|(c, _)| *c == compound) {
                Some((_, existing)) => *existing += sign * value,
                None => side_compounds.push((compound, sign * value)),
            }
        }
        compounds.extend(side_compounds);
    }
    if compounds.is_empty() {
        return Err(equation_error(equation, "no compounds"));
    }
    Ok((direction, compounds))
}

fn parse_side<'a>(side: &'a str, equation: &str) -> Result<Vec<&'a str>, PairsError> {
    let side = side.trim();
    if side.is_empty() {
        return Ok(Vec::new());
    }
    let terms: Vec<&str> = PLUS.split(side).map(str::trim).collect();
    if terms.iter().any(|t| t.is_empty()) {
        return Err(equation_error(equation, "empty term between '+' signs"));
    }
    Ok(terms)
}

fn parse_term(
    term: &str,
    global_compartment: Option<&str>,
    equation: &str,
) -> Result<(Compound, f64), PairsError> {
    let Some(caps) = TERM.captures(term) else {
        return Err(equation_error(equation, &format!("malformed term '{}'", term)));
    };
    let value = match caps.name("paren").or_else(|| caps.name("bare")) {
        Some(m) => m
            .as_str()
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| {
                equation_error(equation, &format!("invalid coefficient '{}'", m.as_str()))
            })?,
        None => 1.0,
    };
    let Some(id) = caps.name("quoted").or_else(|| caps.name("name")) else {
        return Err(equation_error(equation, &format!("missing compound in '{}'", term)));
    };
    let compartment = caps
        .name("comp")
        .map(|m| m.as_str().to_string())
        .or_else(|| global_compartment.map(str::to_string));
    let compound = Compound {
        id: id.as_str().to_string(),
        compartment,
    };
    Ok((compound, value))
}
