//! Paginated identifier search and chunked batch retrieval against the NCBI
//! Entrez eutils endpoints.
//!
//! The two building blocks are [`PagedIdFetcher`], which walks an esearch
//! result set page by page under a shared retry budget, and
//! [`BatchRetriever`], which partitions the identifier list into fixed-size
//! chunks and streams each chunk's records into an output sink. Both take
//! their remote service and delay behavior as capabilities so they can run
//! against synthetic services in tests.

pub mod batch;
pub mod client;
pub mod paged;
pub mod summary;

pub use batch::{BatchFetch, BatchRetriever, ChunkFailure, RetrievalSummary};
pub use client::{split_fasta_records, EutilsClient, SequenceBatch, SummaryBatch};
pub use paged::{PagedIdFetcher, SearchService};
pub use summary::SummaryRecord;

/// Default identifiers per esearch page.
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Default identifiers per efetch/esummary request.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default shared retry budget for a paged identifier fetch.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
