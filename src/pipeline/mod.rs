//! Pagination controller: drives fetch/extract page by page until a
//! terminal condition.
//!
//! State machine per page: FETCH → EXTRACT → DECIDE. Transient fetch
//! failures are retried with capped exponential backoff; a block page or an
//! exhausted retry ceiling ends the run as PARTIAL, keeping everything
//! accumulated so far. Stop conditions at DECIDE, in order: empty page
//! (end of listing), max-page ceiling, cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::config::ScrapeConfig;
use crate::domain::{PageRequest, RawRecord, RunStatus, ScrapeRun};
use crate::extractor::RecordExtractor;
use crate::fetcher::{FetchError, PageContent, PageFetcher};

/// Everything a run produced: the accumulated raw records plus the audit
/// summary. A PARTIAL run keeps all records collected before the failure.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub records: Vec<RawRecord>,
    pub run: ScrapeRun,
}

pub struct Pipeline<F: PageFetcher> {
    fetcher: F,
    extractor: RecordExtractor,
    config: ScrapeConfig,
    cancel: Arc<AtomicBool>,
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(fetcher: F, extractor: RecordExtractor, config: ScrapeConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cooperative cancellation. Honored at the decision point
    /// between pages; an in-flight fetch completes or times out first.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Give the fetcher back so the caller can release the session.
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// Run one category snapshot. Infallible by design: every terminal
    /// state hands the accumulated records onward, so a run never loses
    /// data already collected from prior pages.
    pub async fn run(&self, category: &str) -> ScrapeOutcome {
        let started_at = Utc::now();
        let mut records: Vec<RawRecord> = Vec::new();
        let mut pages_visited = 0u32;
        let mut status = RunStatus::Complete;
        let mut page = 1u32;

        loop {
            let request = PageRequest::new(category, page);

            // FETCH
            let content = match self.fetch_with_retry(&request).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(page, error = %e, "unrecoverable fetch failure, ending run as PARTIAL");
                    status = RunStatus::Partial;
                    break;
                }
            };
            pages_visited += 1;

            // EXTRACT
            let page_records = self.extractor.extract(&content, page);
            tracing::info!(page, count = page_records.len(), "extracted records");
            let page_was_empty = page_records.is_empty();
            records.extend(page_records);

            // DECIDE
            if page_was_empty {
                tracing::info!(page, "empty page, end of listing");
                break;
            }
            if page >= self.config.max_pages {
                tracing::info!(page, "reached max page ceiling");
                break;
            }
            if self.cancel.load(Ordering::Relaxed) {
                tracing::info!(page, "cancellation requested, stopping between pages");
                break;
            }

            tokio::time::sleep(self.config.politeness()).await;
            page += 1;
        }

        let run = ScrapeRun {
            category: category.to_string(),
            started_at,
            finished_at: Utc::now(),
            pages_visited,
            records_extracted: records.len(),
            records_retained: 0,
            records_dropped: 0,
            status,
        };

        ScrapeOutcome { records, run }
    }

    /// Retry one page under the configured attempt ceiling. Blocks are
    /// never retried; transient failures back off with doubling, capped
    /// delays.
    async fn fetch_with_retry(&self, request: &PageRequest) -> Result<PageContent, FetchError> {
        let mut attempt = 1u32;
        loop {
            match self.fetcher.fetch(request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    tracing::warn!(
                        page = request.page,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient fetch failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
