//! Streaming HTTP downloader for bulk dataset files, with resume support
//! and post-download decompression helpers.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use reqwest::Client;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::progress::DownloadProgress;

pub struct HttpDownloader {
    client: Client,
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDownloader {
    pub fn new() -> Self {
        HttpDownloader {
            client: Client::builder()
                .user_agent(concat!("virofetch/", env!("CARGO_PKG_VERSION")))
                // Some release files run to tens of gigabytes.
                .timeout(Duration::from_secs(7200))
                .connect_timeout(Duration::from_secs(60))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap(),
        }
    }

    /// Download `url` into `output_path`, resuming a previous partial
    /// download when the server answers range requests with 206.
    ///
    /// Data streams into `<output_path>.tmp` and is renamed into place only
    /// after the full length arrived, so an interrupted run never leaves a
    /// truncated file at the final path. `.gz` targets are validated before
    /// the rename.
    pub async fn download(
        &self,
        url: &str,
        output_path: &Path,
        progress: &mut DownloadProgress,
        resume: bool,
    ) -> Result<()> {
        progress.set_message(&format!("Downloading from {}", url));

        let temp_path = PathBuf::from(format!("{}.tmp", output_path.display()));

        let mut resume_from = 0u64;
        if resume && temp_path.exists() {
            resume_from = std::fs::metadata(&temp_path)?.len();
            progress.set_message(&format!("Resuming download from {} bytes", resume_from));
        }

        let mut request = self.client.get(url);
        if resume_from > 0 {
            request = request.header("Range", format!("bytes={}-", resume_from));
        }

        let response = request.send().await.context("Failed to start download")?;
        if !response.status().is_success() {
            anyhow::bail!("Server returned status {} for {}", response.status(), url);
        }

        let supports_resume = response.status() == reqwest::StatusCode::PARTIAL_CONTENT;
        if resume_from > 0 && !supports_resume {
            progress.set_message("Server does not support resume, starting from the beginning");
            resume_from = 0;
            std::fs::remove_file(&temp_path).ok();
        }

        let total_size = response.content_length().unwrap_or(0) + resume_from;
        progress.set_total(total_size);
        progress.set_current(resume_from);

        let mut file = if resume_from > 0 && supports_resume {
            std::fs::OpenOptions::new()
                .append(true)
                .open(&temp_path)
                .context("Failed to open temporary file for resume")?
        } else {
            File::create(&temp_path).context("Failed to create temporary file")?
        };

        let mut downloaded = resume_from;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read chunk")?;
            file.write_all(&chunk).context("Failed to write chunk")?;
            downloaded += chunk.len() as u64;
            progress.set_current(downloaded);
        }

        file.flush()?;
        drop(file);

        if total_size > 0 && downloaded < total_size {
            anyhow::bail!(
                "Incomplete download: got {} of {} bytes. Run again to resume.",
                downloaded,
                total_size
            );
        }

        if output_path.extension().and_then(|s| s.to_str()) == Some("gz") {
            progress.set_message("Validating gzip integrity...");
            Self::validate_gzip(&temp_path).with_context(|| {
                format!(
                    "Downloaded file appears corrupted; delete {} and retry",
                    temp_path.display()
                )
            })?;
        }

        std::fs::rename(&temp_path, output_path)
            .context("Failed to move download to final location")?;

        info!(bytes = downloaded, path = %output_path.display(), "Download complete");
        progress.finish();
        Ok(())
    }

    /// Check that a file begins with a readable gzip stream. Reads one block
    /// rather than decompressing the whole file.
    pub fn validate_gzip(path: &Path) -> Result<()> {
        let file = File::open(path).context("Failed to open file for gzip validation")?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut buffer = [0u8; 1024];

        match decoder.read(&mut buffer) {
            // Zero bytes with a decoded header is a valid stream whose
            // payload happens to be empty. A missing or truncated header
            // surfaces as a read error.
            Ok(0) if decoder.header().is_none() => anyhow::bail!("Not a gzip file"),
            Ok(_) => Ok(()),
            Err(e) => anyhow::bail!("Invalid gzip file: {}", e),
        }
    }

    /// Decompress a gzip file into `dest`.
    pub fn decompress_gzip(src: &Path, dest: &Path) -> Result<()> {
        let gz_file = File::open(src).context("Failed to open compressed file")?;
        let mut decoder = GzDecoder::new(BufReader::new(gz_file));
        let mut output = File::create(dest).context("Failed to create output file")?;
        io::copy(&mut decoder, &mut output).context("Failed to decompress file")?;
        info!(src = %src.display(), dest = %dest.display(), "Decompressed");
        Ok(())
    }

    /// Extract a `.tar.gz` archive (the taxonomy dump) into `dir`.
    pub fn extract_tarball(archive: &Path, dir: &Path) -> Result<()> {
        let file = File::open(archive).context("Failed to open archive")?;
        let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        tar.unpack(dir).context("Failed to extract archive")?;
        info!(archive = %archive.display(), dir = %dir.display(), "Extracted");
        Ok(())
    }
}
