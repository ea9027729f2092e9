use std::time::Duration;
use tracing::{debug, warn};

use crate::delay::DelayStrategy;
use crate::entrez::DEFAULT_CHUNK_SIZE;
use crate::sink::RecordSink;
use crate::Result;

/// One remote batch operation: fetches records for every identifier in a
/// chunk. The service's response order is authoritative and need not match
/// the request order.
pub trait BatchFetch {
    type Record;

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<Self::Record>>;
}

/// Failure of a single chunk, identified by its starting offset in the
/// input identifier list.
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub offset: usize,
    pub cause: String,
}

/// Outcome of one retrieval pass over an identifier set.
///
/// A skipped chunk does not abort the job, so the sink may be silently
/// incomplete; callers must check [`RetrievalSummary::is_complete`] before
/// treating the output as whole.
#[derive(Debug, Default)]
pub struct RetrievalSummary {
    pub total_ids: usize,
    pub chunks_attempted: usize,
    pub records_written: usize,
    pub failed_chunks: Vec<ChunkFailure>,
}

impl RetrievalSummary {
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }

    pub fn failed_offsets(&self) -> Vec<usize> {
        self.failed_chunks.iter().map(|f| f.offset).collect()
    }
}

/// Jitter bounds between successive chunk requests.
const CHUNK_JITTER_MIN: Duration = Duration::from_secs(1);
const CHUNK_JITTER_MAX: Duration = Duration::from_secs(3);

/// Wait between opt-in chunk retry attempts.
const CHUNK_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Partitions an identifier list into ordered fixed-size chunks and streams
/// each chunk's records into a sink.
///
/// A failed chunk is logged with its starting offset and skipped; by default
/// it is not retried. Sink write errors are fatal and propagate immediately.
pub struct BatchRetriever<'a, F: BatchFetch> {
    fetch: &'a F,
    delay: &'a dyn DelayStrategy,
    chunk_size: usize,
    chunk_retries: u32,
}

impl<'a, F: BatchFetch> BatchRetriever<'a, F> {
    pub fn new(fetch: &'a F, delay: &'a dyn DelayStrategy) -> Self {
        Self {
            fetch,
            delay,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_retries: 0,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Opt-in: retry a failed chunk up to `retries` times before skipping it.
    /// The default (zero) preserves the log-and-skip behavior.
    pub fn with_chunk_retries(mut self, retries: u32) -> Self {
        self.chunk_retries = retries;
        self
    }

    pub fn retrieve<S: RecordSink<F::Record>>(
        &self,
        ids: &[String],
        sink: &mut S,
    ) -> Result<RetrievalSummary> {
        let mut summary = RetrievalSummary {
            total_ids: ids.len(),
            ..Default::default()
        };
        let chunk_count = (ids.len() + self.chunk_size - 1) / self.chunk_size;

        for (index, chunk) in ids.chunks(self.chunk_size).enumerate() {
            let offset = index * self.chunk_size;
            summary.chunks_attempted += 1;
            debug!(offset, len = chunk.len(), "Fetching chunk");

            match self.fetch_chunk(chunk, offset) {
                Ok(records) => {
                    // Atomic by chunk: records reach the sink only after the
                    // whole chunk fetched and parsed.
                    for record in &records {
                        sink.append(record)?;
                    }
                    summary.records_written += records.len();
                    if index + 1 < chunk_count {
                        self.delay.wait_between(CHUNK_JITTER_MIN, CHUNK_JITTER_MAX);
                    }
                }
                Err(err) => {
                    warn!(offset, "Chunk failed, skipping: {}", err);
                    summary.failed_chunks.push(ChunkFailure {
                        offset,
                        cause: err.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    fn fetch_chunk(&self, chunk: &[String], offset: usize) -> Result<Vec<F::Record>> {
        let mut attempt = 0;
        loop {
            match self.fetch.fetch_batch(chunk) {
                Ok(records) => return Ok(records),
                Err(err) if attempt < self.chunk_retries => {
                    attempt += 1;
                    warn!(
                        offset,
                        attempt, "Chunk attempt failed: {}. Retrying", err
                    );
                    self.delay.wait(CHUNK_RETRY_WAIT);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
