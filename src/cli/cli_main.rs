use super::cli_args::Cli;
use crate::Chemistry::element_weights::ElementWeights;
use crate::Network::load_from_file::{LoadData, load_exclusion_list};
use crate::Network::model::Network;
use crate::Pairing::predictor::{PairPredictor, Predictor};
use crate::Pairing::report::{
    PredictionOutcome, filter_by_element, format_pair_line, round_summary_table,
};
use crate::errors::PairsError;
use crate::settings::PredictionSettings;
use log::{LevelFilter, SetLoggerError, error, info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use std::collections::HashSet;
use std::io::{self, Write};

/// Installs the stderr logger. `Err` when another logger is already installed.
pub fn init_logging(cli: &Cli) -> Result<(), SetLoggerError> {
    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto).is_ok() {
        return Ok(());
    }
    // no terminal
    WriteLogger::init(level, Config::default(), io::stderr())
}

/// Defaults, then the settings file, then the flags.
pub fn resolve_settings(cli: &Cli) -> Result<(PredictionSettings, ElementWeights), PairsError> {
    let mut settings = match &cli.settings {
        Some(path) => PredictionSettings::load(path)?,
        None => PredictionSettings::default(),
    };
    if let Some(method) = cli.method {
        settings.method = method;
    }
    if let Some(max_rounds) = cli.max_rounds {
        settings.max_rounds = max_rounds;
    }
    if let Some(element) = &cli.report_element {
        settings.report_element = Some(element.clone());
    }
    settings.validate()?;
    let weights = match &cli.weights {
        Some(spec) => ElementWeights::parse(spec)?,
        None => settings.element_weights()?,
    };
    Ok((settings, weights))
}

/// Loads the model, predicts and writes one line per pair to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<PredictionOutcome, PairsError> {
    let (settings, weights) = resolve_settings(cli)?;
    let network = LoadData::new(cli.compounds.clone(), cli.reactions.clone()).load_network()?;
    let excluded = match &cli.exclude {
        Some(path) => load_exclusion_list(path)?,
        None => HashSet::new(),
    };
    let predictor = Predictor::from_settings(&settings);
    info!(
        "Predicting primary pairs of {} reactions with method {}",
        network.reactions().len() - excluded_count(&network, &excluded),
        predictor.name()
    );
    let outcome = predictor.predict(&network, &weights, &excluded)?;

    for pair in filter_by_element(&outcome.pairs, settings.report_element.as_deref()) {
        writeln!(out, "{}", format_pair_line(&pair))?;
    }
    Ok(outcome)
}

fn excluded_count(network: &Network, excluded: &HashSet<String>) -> usize {
    network
        .reactions()
        .iter()
        .filter(|r| excluded.contains(&r.id))
        .count()
}

/// Runs the command; `Ok(false)` when some reaction failed.
pub fn run(cli: &Cli) -> Result<bool, PairsError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = execute(cli, &mut out)?;
    out.flush()?;

    for reaction in &outcome.ambiguous {
        warn!("reaction {} is ambiguous, reported with one of its optimal pairings", reaction);
    }
    for (reaction, failure) in &outcome.failures {
        error!("reaction {} has no prediction: {}", reaction, failure);
    }
    if !cli.quiet && !outcome.rounds.is_empty() {
        round_summary_table(&outcome.rounds).print(&mut io::stderr())?;
    }
    info!(
        "{} pairs, {} ambiguous reactions, {} skipped, {} failed",
        outcome.pairs.len(),
        outcome.ambiguous.len(),
        outcome.diagnostics.iter().filter(|d| d.skips_reaction()).count(),
        outcome.failures.len()
    );
    Ok(outcome.failures.is_empty())
}
