use std::time::Duration;
use tracing::{debug, warn};

use crate::delay::DelayStrategy;
use crate::{Result, VirofetchError};

/// One page of a remote identifier search.
pub trait SearchService {
    /// Return up to `retmax` identifiers matching `query`, starting at
    /// `retstart`. A page shorter than `retmax` means end of results.
    fn search_page(&self, query: &str, retstart: usize, retmax: usize) -> Result<Vec<String>>;
}

/// Fixed wait before retrying a failed page.
const RETRY_WAIT: Duration = Duration::from_secs(5);

/// Jitter bounds between successive page requests.
const PAGE_JITTER_MIN: Duration = Duration::from_millis(500);
const PAGE_JITTER_MAX: Duration = Duration::from_secs(2);

/// Retrieves the complete identifier list for a query in bounded pages.
pub struct PagedIdFetcher<'a, S: SearchService> {
    service: &'a S,
    delay: &'a dyn DelayStrategy,
}

impl<'a, S: SearchService> PagedIdFetcher<'a, S> {
    pub fn new(service: &'a S, delay: &'a dyn DelayStrategy) -> Self {
        Self { service, delay }
    }

    /// Fetch every matching identifier, `page_size` per request, preserving
    /// the order the service yields them.
    ///
    /// The retry budget is shared across the whole multi-page fetch: a
    /// transient failure on any page decrements the same counter and retries
    /// the same page after a fixed wait. Exhausting the budget fails the
    /// entire fetch and discards the accumulated partial result.
    pub fn fetch_all_ids(
        &self,
        query: &str,
        page_size: usize,
        max_retries: u32,
    ) -> Result<Vec<String>> {
        // A zero-size page could never look short, so termination would
        // never trigger.
        if page_size == 0 {
            return Err(VirofetchError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }

        let mut ids = Vec::new();
        let mut retstart = 0usize;
        let mut retries_left = max_retries;

        loop {
            debug!(retstart, page_size, "Fetching identifier page");
            match self.service.search_page(query, retstart, page_size) {
                Ok(page) => {
                    let received = page.len();
                    ids.extend(page);
                    if received < page_size {
                        // Short page is the definite end-of-results signal.
                        break;
                    }
                    retstart += page_size;
                    self.delay.wait_between(PAGE_JITTER_MIN, PAGE_JITTER_MAX);
                }
                Err(err) => {
                    retries_left = retries_left.saturating_sub(1);
                    if retries_left == 0 {
                        return Err(VirofetchError::ExhaustedRetries {
                            attempts: max_retries,
                            last: err.to_string(),
                        });
                    }
                    warn!(
                        retstart,
                        remaining = retries_left,
                        "Page fetch failed: {}. Retrying same page",
                        err
                    );
                    self.delay.wait(RETRY_WAIT);
                }
            }
        }

        debug!(total = ids.len(), "Identifier fetch complete");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::NoDelay;
    use std::cell::Cell;

    /// Synthetic search service backed by a fixed identifier list, optionally
    /// failing the first `fail_first` requests.
    struct ScriptedSearch {
        ids: Vec<String>,
        fail_first: Cell<u32>,
        calls: Cell<usize>,
    }

    impl ScriptedSearch {
        fn with_count(n: usize) -> Self {
            Self {
                ids: (0..n).map(|i| format!("id{}", i)).collect(),
                fail_first: Cell::new(0),
                calls: Cell::new(0),
            }
        }

        fn failing_first(mut self, failures: u32) -> Self {
            self.fail_first = Cell::new(failures);
            self
        }
    }

    impl SearchService for ScriptedSearch {
        fn search_page(&self, _query: &str, retstart: usize, retmax: usize) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_first.get() > 0 {
                self.fail_first.set(self.fail_first.get() - 1);
                return Err(VirofetchError::Transient("synthetic outage".into()));
            }
            Ok(self
                .ids
                .iter()
                .skip(retstart)
                .take(retmax)
                .cloned()
                .collect())
        }
    }

    #[test]
    fn five_ids_with_page_size_two_takes_three_requests() {
        let service = ScriptedSearch::with_count(5);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let ids = fetcher
            .fetch_all_ids("txid10239[Organism] AND complete genome[Title]", 2, 5)
            .unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(service.calls.get(), 3);
        assert_eq!(ids[0], "id0");
        assert_eq!(ids[4], "id4");
    }

    #[test]
    fn exact_page_multiple_needs_one_extra_empty_request() {
        let service = ScriptedSearch::with_count(4);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let ids = fetcher.fetch_all_ids("q", 2, 5).unwrap();

        assert_eq!(ids.len(), 4);
        // Pages of 2, 2 and a final empty page to detect termination.
        assert_eq!(service.calls.get(), 3);
    }

    #[test]
    fn zero_page_size_is_rejected_up_front() {
        let service = ScriptedSearch::with_count(5);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let err = fetcher.fetch_all_ids("q", 0, 5).unwrap_err();

        assert!(matches!(err, VirofetchError::Config(_)));
        // No request goes out for an unservable page size.
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn empty_result_set_is_not_an_error() {
        let service = ScriptedSearch::with_count(0);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let ids = fetcher.fetch_all_ids("q", 100, 5).unwrap();

        assert!(ids.is_empty());
        assert_eq!(service.calls.get(), 1);
    }

    #[test]
    fn transient_failures_below_budget_still_succeed() {
        let service = ScriptedSearch::with_count(6).failing_first(3);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let ids = fetcher.fetch_all_ids("q", 2, 5).unwrap();

        assert_eq!(ids.len(), 6);
        // 3 failed attempts on the first page, then 4 successful pages
        // (2, 2, 2, empty).
        assert_eq!(service.calls.get(), 7);
    }

    #[test]
    fn exhausted_budget_fails_without_partial_data() {
        let service = ScriptedSearch::with_count(6).failing_first(10);
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let err = fetcher.fetch_all_ids("q", 2, 5).unwrap_err();

        match err {
            VirofetchError::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(last.contains("synthetic outage"));
            }
            other => panic!("expected ExhaustedRetries, got {:?}", other),
        }
        assert_eq!(service.calls.get(), 5);
    }

    #[test]
    fn retry_budget_is_shared_across_pages() {
        // Fails twice on the first page; budget 5 leaves 3 for later pages.
        // A synthetic service that fails again mid-fetch would drain the same
        // counter, so model that: 2 early failures + 3 mid-fetch failures
        // exhaust a budget of 5.
        struct TwoPhaseFailure {
            calls: Cell<usize>,
        }

        impl SearchService for TwoPhaseFailure {
            fn search_page(
                &self,
                _query: &str,
                retstart: usize,
                retmax: usize,
            ) -> Result<Vec<String>> {
                let call = self.calls.get();
                self.calls.set(call + 1);
                // Calls 0,1 fail (page 0), call 2 succeeds with a full page,
                // calls 3.. fail on page 1 until the budget runs out.
                match call {
                    0 | 1 => Err(VirofetchError::Transient("early".into())),
                    2 => Ok((0..retmax).map(|i| format!("id{}", retstart + i)).collect()),
                    _ => Err(VirofetchError::Transient("late".into())),
                }
            }
        }

        let service = TwoPhaseFailure { calls: Cell::new(0) };
        let fetcher = PagedIdFetcher::new(&service, &NoDelay);

        let err = fetcher.fetch_all_ids("q", 2, 5).unwrap_err();

        assert!(matches!(err, VirofetchError::ExhaustedRetries { .. }));
        // 2 early failures + 1 success + 3 late failures = 6 calls.
        assert_eq!(service.calls.get(), 6);
    }
}
