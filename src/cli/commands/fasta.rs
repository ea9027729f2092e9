use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::entrez::EutilsClient;

#[derive(Args)]
pub struct FastaArgs {
    /// Accession identifier (e.g. NC_074663.1) or path to a file with one
    /// accession per line
    pub input: String,

    /// Contact email, required by the NCBI Entrez usage policy
    #[arg(short, long)]
    pub email: String,

    /// Output folder; one <accession>.fasta is written per identifier
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// NCBI API key (raises the request rate limit)
    #[arg(long, env = "NCBI_API_KEY")]
    pub api_key: Option<String>,
}

pub fn run(args: FastaArgs) -> Result<()> {
    let ids = read_input(&args.input)?;
    if ids.is_empty() {
        bail!("No accession identifiers in {}", args.input);
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;
    let client = EutilsClient::new("nucleotide", &args.email, args.api_key.clone())?;

    let mut failures = 0usize;
    for id in &ids {
        match client.efetch_fasta(std::slice::from_ref(id)) {
            Ok(records) if !records.is_empty() => {
                let path = args.output.join(format!("{}.fasta", id));
                fs::write(&path, records.concat())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Saved {}", path.display());
            }
            Ok(_) => {
                warn!("No FASTA returned for {}", id);
                failures += 1;
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", id, e);
                failures += 1;
            }
        }
    }

    if failures == ids.len() {
        bail!("Every fetch failed ({} identifiers)", ids.len());
    }
    if failures > 0 {
        warn!("{} of {} identifiers failed", failures, ids.len());
    }
    Ok(())
}

/// A path argument is read as a list file, one accession per line;
/// anything else is treated as a single accession.
fn read_input(input: &str) -> Result<Vec<String>> {
    let path = Path::new(input);
    if path.is_file() {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", input))?;
        let ids: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        info!("Loaded {} identifiers from {}", ids.len(), input);
        Ok(ids)
    } else {
        Ok(vec![input.to_string()])
    }
}
