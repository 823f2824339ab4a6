use cardsort::cli::{self, Args};
use cardsort::output::OutputFormatter;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing(args.verbose);

    match cli::run_cli(&args) {
        Ok(summary) => cli::exit_code(&summary),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
