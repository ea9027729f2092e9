use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::delay::JitterSleep;
use crate::entrez::{
    BatchRetriever, EutilsClient, PagedIdFetcher, RetrievalSummary, SequenceBatch, SummaryBatch,
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
};
use crate::sink::{CsvSink, FastaSink};

/// Viral taxonomic groups and their NCBI taxonomy identifiers.
pub const TAXONOMIC_GROUPS: [(&str, &str); 5] = [
    ("dsDnaViruses", "35237"),
    ("dsRnaViruses", "35325"),
    ("ssDnaViruses", "29258"),
    ("ssRnaViruses", "439488"),
    ("allViruses", "10239"),
];

#[derive(Args)]
pub struct GenomesArgs {
    /// Source database filter
    #[arg(short, long, default_value = "genbank", value_parser = ["genbank", "refseq"])]
    pub database: String,

    /// Contact email, required by the NCBI Entrez usage policy
    #[arg(short, long)]
    pub email: String,

    /// Title term to search for
    #[arg(short, long, default_value = "complete genome")]
    pub genome_type: String,

    /// Output directory
    #[arg(short, long, default_value = "genomes")]
    pub output: PathBuf,

    /// Restrict to specific groups (repeatable); default is every group
    #[arg(long, value_name = "NAME")]
    pub group: Vec<String>,

    /// Identifiers per esearch page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Identifiers per efetch/esummary request
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Shared retry budget for the paged identifier fetch
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Retry a failed chunk this many times instead of skipping it
    #[arg(long, default_value_t = 0)]
    pub chunk_retries: u32,

    /// NCBI API key (raises the request rate limit)
    #[arg(long, env = "NCBI_API_KEY")]
    pub api_key: Option<String>,
}

pub fn run(args: GenomesArgs) -> Result<()> {
    let groups = select_groups(&args.group)?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    let client = EutilsClient::new("nuccore", &args.email, args.api_key.clone())?;
    let delay = JitterSleep;
    let mut incomplete_outputs = 0usize;

    for (group, taxid) in groups {
        info!("Processing {} (TaxID {})", group, taxid);
        let query = build_query(taxid, &args.genome_type, &args.database);

        let fetcher = PagedIdFetcher::new(&client, &delay);
        let ids = fetcher
            .fetch_all_ids(&query, args.page_size, args.max_retries)
            .with_context(|| format!("Identifier search failed for {}", group))?;

        if ids.is_empty() {
            warn!("No genomes found for {} (TaxID {})", group, taxid);
            continue;
        }
        info!("Found {} records for {}", ids.len(), group);

        let fasta_path = args
            .output
            .join(format!("{}_{}_genomes.fasta", group, args.database));
        let csv_path = args
            .output
            .join(format!("{}_{}_metadata.csv", group, args.database));

        let mut fasta_sink = FastaSink::create(&fasta_path)
            .with_context(|| format!("Failed to create {}", fasta_path.display()))?;
        let sequences = BatchRetriever::new(&SequenceBatch(&client), &delay)
            .with_chunk_size(args.chunk_size)
            .with_chunk_retries(args.chunk_retries)
            .retrieve(&ids, &mut fasta_sink)?;
        fasta_sink.flush()?;
        report(group, "sequences", &sequences);

        let mut csv_sink = CsvSink::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let metadata = BatchRetriever::new(&SummaryBatch(&client), &delay)
            .with_chunk_size(args.chunk_size)
            .with_chunk_retries(args.chunk_retries)
            .retrieve(&ids, &mut csv_sink)?;
        csv_sink.flush()?;
        report(group, "metadata", &metadata);

        incomplete_outputs +=
            usize::from(!sequences.is_complete()) + usize::from(!metadata.is_complete());
    }

    if incomplete_outputs > 0 {
        warn!(
            "{} output file(s) are missing chunks; see the offsets logged above",
            incomplete_outputs
        );
    }
    Ok(())
}

/// Entrez query for one taxonomic group, matching by organism TaxID and
/// title term, restricted to RefSeq records when requested.
pub fn build_query(taxid: &str, genome_type: &str, database: &str) -> String {
    let base = format!("txid{}[Organism] AND {}[Title]", taxid, genome_type);
    if database == "refseq" {
        format!("{} AND refseq[Filter]", base)
    } else {
        base
    }
}

fn select_groups(requested: &[String]) -> Result<Vec<(&'static str, &'static str)>> {
    if requested.is_empty() {
        return Ok(TAXONOMIC_GROUPS.to_vec());
    }
    let mut selected = Vec::with_capacity(requested.len());
    for name in requested {
        match TAXONOMIC_GROUPS.iter().find(|(group, _)| group == name) {
            Some(entry) => selected.push(*entry),
            None => bail!(
                "Unknown group '{}'. Known groups: {}",
                name,
                TAXONOMIC_GROUPS
                    .iter()
                    .map(|(g, _)| *g)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
    Ok(selected)
}

fn report(group: &str, kind: &str, summary: &RetrievalSummary) {
    if summary.is_complete() {
        info!(
            "{} {}: {} records written across {} chunks",
            group, kind, summary.records_written, summary.chunks_attempted
        );
    } else {
        warn!(
            "{} {}: INCOMPLETE - {} of {} chunks failed (offsets {:?}); {} records written",
            group,
            kind,
            summary.failed_chunks.len(),
            summary.chunks_attempted,
            summary.failed_offsets(),
            summary.records_written
        );
    }
}
