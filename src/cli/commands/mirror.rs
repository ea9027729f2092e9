use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::download::{Dataset, DownloadProgress, HttpDownloader};

#[derive(Args)]
pub struct MirrorArgs {
    /// Named dataset to download
    #[arg(
        long,
        conflicts_with = "url",
        value_parser = ["refseq-viral", "taxdump", "accession2taxid", "swissprot-viral", "trembl-viral"]
    )]
    pub dataset: Option<String>,

    /// Arbitrary URL to download instead of a named dataset
    #[arg(long)]
    pub url: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Start over instead of resuming a partial download
    #[arg(long)]
    pub no_resume: bool,

    /// Decompress (.gz) or extract (.tar.gz) after the download
    #[arg(long)]
    pub extract: bool,

    /// Keep the compressed file after decompression or extraction
    #[arg(long)]
    pub keep_compressed: bool,
}

pub fn run(args: MirrorArgs) -> Result<()> {
    let (url, filename, is_tarball) = match (&args.dataset, &args.url) {
        (Some(name), None) => {
            let dataset: Dataset = name.parse().map_err(|e: String| anyhow!(e))?;
            info!("{}: {}", dataset, dataset.description());
            (
                dataset.url().to_string(),
                dataset.filename().to_string(),
                dataset.is_tarball(),
            )
        }
        (None, Some(url)) => {
            let filename = filename_from_url(url)?;
            let is_tarball = filename.ends_with(".tar.gz");
            (url.clone(), filename, is_tarball)
        }
        _ => bail!("Specify exactly one of --dataset or --url"),
    };

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let target = args.output_dir.join(&filename);

    let runtime = tokio::runtime::Runtime::new()?;
    let downloader = HttpDownloader::new();
    let mut progress = DownloadProgress::new();
    runtime.block_on(async {
        downloader
            .download(&url, &target, &mut progress, !args.no_resume)
            .await
    })?;

    if args.extract {
        if is_tarball {
            HttpDownloader::extract_tarball(&target, &args.output_dir)?;
        } else if filename.ends_with(".gz") {
            let dest = args.output_dir.join(filename.trim_end_matches(".gz"));
            HttpDownloader::decompress_gzip(&target, &dest)?;
        } else {
            warn!("{} is not compressed, nothing to extract", filename);
            return Ok(());
        }
        if !args.keep_compressed {
            fs::remove_file(&target)
                .with_context(|| format!("Failed to remove {}", target.display()))?;
        }
    }
    Ok(())
}

fn filename_from_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot derive a filename from {}", url))
}
