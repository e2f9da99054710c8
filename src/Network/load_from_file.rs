use crate::Chemistry::formula::Formula;
use crate::Network::equation_parser::parse_equation;
use crate::Network::model::{CompoundEntry, Network, Reaction};
use crate::errors::PairsError;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the files describing one model.
pub struct LoadData {
    pub compounds_file: PathBuf,
    pub reactions_file: PathBuf,
}

impl LoadData {
    pub fn new(compounds_file: PathBuf, reactions_file: PathBuf) -> Self {
        LoadData {
            compounds_file,
            reactions_file,
        }
    }

    pub fn load_network(&self) -> Result<Network, PairsError> {
        load_network(&self.compounds_file, &self.reactions_file)
    }
}

fn read_file(path: &Path) -> Result<String, PairsError> {
    if !path.exists() {
        error!("File '{}' does not exist", path.display());
    }
    fs::read_to_string(path).map_err(|e| {
        error!("Failed to read file '{}': {}", path.display(), e);
        PairsError::Io(e)
    })
}

fn load_error(path: &Path, line: usize, reason: String) -> PairsError {
    PairsError::Load {
        file: path.display().to_string(),
        line,
        reason,
    }
}

/// strips a '#' comment and surrounding whitespace
fn content_of(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

/// Parses a tab-separated compound table. The first non-comment line is the header
/// and must contain an `id` column; `formula` and `name` columns are optional.
/// Compounds whose formula cannot be parsed are kept without formula.
pub fn parse_compound_table(text: &str, path: &Path) -> Result<Vec<CompoundEntry>, PairsError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'));

    let Some((header_index, header)) = lines.next() else {
        warn!("Compound table '{}' is empty", path.display());
        return Ok(Vec::new());
    };
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let column = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));
    let Some(id_column) = column("id") else {
        return Err(load_error(
            path,
            header_index + 1,
            "expected `id` column in table header".to_string(),
        ));
    };
    let formula_column = column("formula");
    let name_column = column("name");
    if formula_column.is_none() {
        warn!(
            "Compound table '{}' has no `formula` column, no compound can be paired",
            path.display()
        );
    }

    let mut entries = Vec::new();
    for (index, line) in lines {
        let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
        let cell = |column: Option<usize>| {
            column
                .and_then(|c| cells.get(c).copied())
                .filter(|value| !value.is_empty())
        };
        let Some(id) = cell(Some(id_column)) else {
            return Err(load_error(path, index + 1, "empty compound id".to_string()));
        };
        let formula = match cell(formula_column) {
            Some(text) => match Formula::parse(text) {
                Ok(formula) => Some(formula),
                Err(e) => {
                    warn!("Compound '{}' will be ignored for pairing: {}", id, e);
                    None
                }
            },
            None => None,
        };
        let mut entry = CompoundEntry::new(id, formula);
        entry.name = cell(name_column).map(str::to_string);
        entries.push(entry);
    }
    Ok(entries)
}

/// Parses a reaction table: one `<id> <equation>` per line, '#' starts a comment.
pub fn parse_reaction_table(text: &str, path: &Path) -> Result<Vec<Reaction>, PairsError> {
    let mut reactions = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = content_of(line);
        if line.is_empty() {
            continue;
        }
        let Some((id, equation)) = line.split_once(char::is_whitespace) else {
            return Err(load_error(
                path,
                index + 1,
                format!("expected reaction id and equation, found '{}'", line),
            ));
        };
        let (direction, compounds) =
            parse_equation(equation.trim()).map_err(|e| load_error(path, index + 1, e.to_string()))?;
        reactions.push(Reaction::new(id, direction, compounds));
    }
    Ok(reactions)
}

pub fn load_compound_table(path: &Path) -> Result<Vec<CompoundEntry>, PairsError> {
    let text = read_file(path)?;
    let entries = parse_compound_table(&text, path)?;
    info!(
        "Loaded {} compounds from file '{}'",
        entries.len(),
        path.display()
    );
    Ok(entries)
}

pub fn load_reaction_table(path: &Path) -> Result<Vec<Reaction>, PairsError> {
    let text = read_file(path)?;
    let reactions = parse_reaction_table(&text, path)?;
    info!(
        "Loaded {} reactions ({} reversible) from file '{}'",
        reactions.len(),
        reactions.iter().filter(|r| r.is_reversible()).count(),
        path.display()
    );
    Ok(reactions)
}

/// Newline-separated reaction ids; blank lines and '#' comments are ignored.
pub fn load_exclusion_list(path: &Path) -> Result<HashSet<String>, PairsError> {
    let text = read_file(path)?;
    let excluded: HashSet<String> = text
        .lines()
        .map(content_of)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    info!(
        "Loaded {} excluded reactions from file '{}'",
        excluded.len(),
        path.display()
    );
    Ok(excluded)
}

/// Loads compounds and reactions into a network. Duplicated compound ids keep the
/// last entry.
pub fn load_network(compounds_file: &Path, reactions_file: &Path) -> Result<Network, PairsError> {
    let mut network = Network::new();
    let mut seen = HashSet::new();
    for entry in load_compound_table(compounds_file)? {
        if !seen.insert(entry.id.clone()) {
            warn!("Compound '{}' is defined more than once", entry.id);
        }
        network.add_compound(entry);
    }
    let mut seen = HashSet::new();
    for reaction in load_reaction_table(reactions_file)? {
        if !seen.insert(reaction.id.clone()) {
            warn!("Reaction '{}' is defined more than once", reaction.id);
        }
        network.add_reaction(reaction);
    }
    Ok(network)
}
