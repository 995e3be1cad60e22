use clap::Parser;
use labelset::cli::Cli;
use labelset::config::options_from_cli;
use labelset::{LabelsetError, run_build};
use std::process::ExitCode;

fn run() -> Result<(), LabelsetError> {
    let cli = Cli::parse();
    let opts = options_from_cli(&cli)?;
    log::debug!("build options: {opts:?}");

    let summary = run_build(&opts)?;
    println!("wrote {} records to {}", summary.written, summary.out.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("labelset: {e}");
            ExitCode::from(1)
        }
    }
}
