pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "virofetch",
    version,
    about = "Download viral genome and proteome datasets from NCBI and UniProt",
    long_about = "Virofetch retrieves viral sequence data for downstream indexing tools: \
                  paginated Entrez searches with chunked sequence and metadata downloads, \
                  per-accession FASTA fetches, and bulk dataset mirroring with resume."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Default log filter directive for a `-v` count. The environment variable
/// only overrides the unraised default.
pub fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download genomes and metadata for viral taxonomic groups via Entrez
    Genomes(commands::genomes::GenomesArgs),

    /// Fetch FASTA records for explicit accession identifiers
    Fasta(commands::fasta::FastaArgs),

    /// Mirror a bulk dataset file (RefSeq release, taxdump, accession2taxid, UniProt)
    Mirror(commands::mirror::MirrorArgs),
}
