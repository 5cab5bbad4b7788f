use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    roster_vault::logging::init();
    let cli = roster_vault::cli::Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(roster_vault::cli::exit_code(&err))
        }
    }
}
