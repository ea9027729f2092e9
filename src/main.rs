use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;
use virofetch::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // -v/-vv raise the default level; VIROFETCH_LOG overrides an unraised
    // default.
    let log_level = if cli.verbose > 0 {
        virofetch::cli::log_directive(cli.verbose).to_string()
    } else {
        std::env::var("VIROFETCH_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<virofetch::VirofetchError>() {
            Some(virofetch::VirofetchError::Config(_)) => 2,
            Some(virofetch::VirofetchError::Io(_)) => 3,
            Some(virofetch::VirofetchError::Parse(_)) => 4,
            Some(virofetch::VirofetchError::ExhaustedRetries { .. }) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Genomes(args) => virofetch::cli::commands::genomes::run(args),
        Commands::Fasta(args) => virofetch::cli::commands::fasta::run(args),
        Commands::Mirror(args) => virofetch::cli::commands::mirror::run(args),
    }
}
