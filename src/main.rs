use PrimaryPairs::cli::cli_args;
use PrimaryPairs::cli::cli_main::{init_logging, run};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli_args::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("primarypairs: logging unavailable: {}", e);
    }
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
