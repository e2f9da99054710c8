use crate::settings::Method;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "primarypairs",
    about = "Predict primary reactant/product pairs and transferred elements of metabolic reactions",
    version
)]
pub struct Cli {
    /// Compound table (tab-separated, header with `id` and `formula` columns)
    #[arg(long, value_name = "FILE")]
    pub compounds: PathBuf,

    /// Reaction table, one `<id> <equation>` per line
    #[arg(long, value_name = "FILE")]
    pub reactions: PathBuf,

    /// Reaction ids to skip, one per line
    #[arg(long, value_name = "FILE")]
    pub exclude: Option<PathBuf>,

    /// Element weights, e.g. "C=1,H=0,*=0.82"
    #[arg(long, value_name = "SPEC")]
    pub weights: Option<String>,

    /// Report only the atoms of this element
    #[arg(long = "report-element", value_name = "SYMBOL")]
    pub report_element: Option<String>,

    /// Prediction method
    #[arg(long, value_enum, value_name = "METHOD")]
    pub method: Option<Method>,

    /// Maximum number of refinement rounds (fpp)
    #[arg(long = "max-rounds", value_name = "N")]
    pub max_rounds: Option<usize>,

    /// JSON settings file; flags given on the command line take precedence
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Only warnings and errors on stderr, no round summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug output on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
