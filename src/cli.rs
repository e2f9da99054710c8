/// Command line arguments of `primarypairs`.
pub mod cli_args;
/// Logging setup and the prediction run behind the command line.
pub mod cli_main;
