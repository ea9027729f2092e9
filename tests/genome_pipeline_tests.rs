//! End-to-end retrieval pipeline tests against synthetic Entrez services:
//! paged identifier search feeding chunked sequence and metadata downloads
//! into real files.

use std::cell::{Cell, RefCell};
use std::fs;

use tempfile::TempDir;

use virofetch::delay::NoDelay;
use virofetch::entrez::{
    BatchFetch, BatchRetriever, PagedIdFetcher, SearchService, SummaryRecord,
};
use virofetch::sink::{CsvSink, FastaSink};
use virofetch::{Result, VirofetchError};

/// Synthetic search service over a fixed identifier universe.
struct FakeSearch {
    ids: Vec<String>,
    calls: Cell<usize>,
}

impl FakeSearch {
    fn with_count(n: usize) -> Self {
        Self {
            ids: (1..=n).map(|i| i.to_string()).collect(),
            calls: Cell::new(0),
        }
    }
}

impl SearchService for FakeSearch {
    fn search_page(&self, _query: &str, retstart: usize, retmax: usize) -> Result<Vec<String>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self
            .ids
            .iter()
            .skip(retstart)
            .take(retmax)
            .cloned()
            .collect())
    }
}

/// Synthetic efetch: one FASTA record per id, optionally failing whole
/// chunks by index.
struct FakeSequences {
    batch_sizes: RefCell<Vec<usize>>,
    fail_chunk: Option<usize>,
}

impl BatchFetch for FakeSequences {
    type Record = String;

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<String>> {
        let call = self.batch_sizes.borrow().len();
        self.batch_sizes.borrow_mut().push(ids.len());
        if Some(call) == self.fail_chunk {
            return Err(VirofetchError::Transient("simulated outage".into()));
        }
        Ok(ids
            .iter()
            .map(|id| format!(">seq{} synthetic record\nACGTACGT\n", id))
            .collect())
    }
}

/// Synthetic esummary: structured records, every odd id missing its length.
struct FakeSummaries;

impl BatchFetch for FakeSummaries {
    type Record = SummaryRecord;

    fn fetch_batch(&self, ids: &[String]) -> Result<Vec<SummaryRecord>> {
        Ok(ids
            .iter()
            .map(|id| {
                let n: u64 = id.parse().unwrap();
                SummaryRecord {
                    accession: Some(format!("NC_{:06}.1", n)),
                    tax_id: Some(10239),
                    title: Some(format!("Virus {}, complete genome", n)),
                    organism: Some(format!("Virus {}", n)),
                    length: (n % 2 == 0).then_some(29903),
                    update_date: Some("2024/06/01".into()),
                }
            })
            .collect())
    }
}

#[test]
fn paged_search_feeds_chunked_retrieval_end_to_end() {
    let dir = TempDir::new().unwrap();
    let search = FakeSearch::with_count(5);

    // Named scenario: page_size=2 over 5 ids takes pages of 2, 2, 1.
    let ids = PagedIdFetcher::new(&search, &NoDelay)
        .fetch_all_ids("txid10239[Organism] AND complete genome[Title]", 2, 5)
        .unwrap();
    assert_eq!(search.calls.get(), 3);
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

    let fasta_path = dir.path().join("allViruses_genbank_genomes.fasta");
    let sequences = FakeSequences {
        batch_sizes: RefCell::new(Vec::new()),
        fail_chunk: None,
    };
    let mut fasta_sink = FastaSink::create(&fasta_path).unwrap();
    let summary = BatchRetriever::new(&sequences, &NoDelay)
        .with_chunk_size(2)
        .retrieve(&ids, &mut fasta_sink)
        .unwrap();
    fasta_sink.flush().unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.records_written, 5);
    assert_eq!(*sequences.batch_sizes.borrow(), vec![2, 2, 1]);

    let fasta = fs::read_to_string(&fasta_path).unwrap();
    assert_eq!(fasta.matches('>').count(), 5);
    assert!(fasta.starts_with(">seq1 "));
    assert!(fasta.contains(">seq5 "));
}

#[test]
fn chunk_partition_covers_1200_ids_in_three_batches() {
    let ids: Vec<String> = (1..=1200).map(|i| i.to_string()).collect();
    let sequences = FakeSequences {
        batch_sizes: RefCell::new(Vec::new()),
        fail_chunk: None,
    };

    let dir = TempDir::new().unwrap();
    let mut sink = FastaSink::create(&dir.path().join("out.fasta")).unwrap();
    let summary = BatchRetriever::new(&sequences, &NoDelay)
        .with_chunk_size(500)
        .retrieve(&ids, &mut sink)
        .unwrap();

    assert_eq!(*sequences.batch_sizes.borrow(), vec![500, 500, 200]);
    assert_eq!(summary.records_written, 1200);
}

#[test]
fn failed_sequence_chunk_leaves_a_gap_but_not_a_dead_job() {
    let ids: Vec<String> = (1..=6).map(|i| i.to_string()).collect();
    let sequences = FakeSequences {
        batch_sizes: RefCell::new(Vec::new()),
        fail_chunk: Some(1),
    };

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.fasta");
    let mut sink = FastaSink::create(&path).unwrap();
    let summary = BatchRetriever::new(&sequences, &NoDelay)
        .with_chunk_size(2)
        .retrieve(&ids, &mut sink)
        .unwrap();
    sink.flush().unwrap();

    assert!(!summary.is_complete());
    assert_eq!(summary.failed_offsets(), vec![2]);
    assert_eq!(summary.records_written, 4);

    let fasta = fs::read_to_string(&path).unwrap();
    // Chunks 0 and 2 are present, the failed middle chunk is absent.
    assert!(fasta.contains(">seq1 "));
    assert!(fasta.contains(">seq2 "));
    assert!(!fasta.contains(">seq3 "));
    assert!(!fasta.contains(">seq4 "));
    assert!(fasta.contains(">seq5 "));
    assert!(fasta.contains(">seq6 "));
}

#[test]
fn metadata_csv_has_fixed_schema_with_na_defaults() {
    let ids: Vec<String> = (1..=3).map(|i| i.to_string()).collect();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metadata.csv");
    let mut sink = CsvSink::create(&path).unwrap();
    let summary = BatchRetriever::new(&FakeSummaries, &NoDelay)
        .with_chunk_size(500)
        .retrieve(&ids, &mut sink)
        .unwrap();
    sink.flush().unwrap();

    assert!(summary.is_complete());

    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Accession,TaxonomyId,Title,Organism,Length,UpdateDate");
    // Odd ids have no length and must project as N/A; titles with commas
    // are quoted.
    assert_eq!(
        lines[1],
        "NC_000001.1,10239,\"Virus 1, complete genome\",Virus 1,N/A,2024/06/01"
    );
    assert_eq!(
        lines[2],
        "NC_000002.1,10239,\"Virus 2, complete genome\",Virus 2,29903,2024/06/01"
    );
}

#[test]
fn empty_search_result_short_circuits_cleanly() {
    let search = FakeSearch::with_count(0);
    let ids = PagedIdFetcher::new(&search, &NoDelay)
        .fetch_all_ids("txid0[Organism]", 100, 5)
        .unwrap();
    assert!(ids.is_empty());
    assert_eq!(search.calls.get(), 1);
}
