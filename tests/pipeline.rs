//! Pagination controller behavior, driven through the `PageFetcher` trait
//! with a scripted in-memory fetcher.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;

use ranksnap::config::{ScrapeConfig, SelectorConfig};
use ranksnap::domain::{PageRequest, RunStatus};
use ranksnap::extractor::RecordExtractor;
use ranksnap::fetcher::{FetchError, PageContent, PageFetcher};
use ranksnap::normalizer::Normalizer;
use ranksnap::pipeline::Pipeline;

enum Step {
    Page(String),
    Fail(FetchError),
}

/// Replays a fixed script of fetch outcomes, then keeps serving `fallback`.
struct ScriptedFetcher {
    script: Mutex<VecDeque<Step>>,
    fallback: String,
}

impl ScriptedFetcher {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            fallback: empty_page(),
        }
    }

    fn with_fallback(steps: Vec<Step>, fallback: String) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            fallback,
        }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, _request: &PageRequest) -> Result<PageContent, FetchError> {
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Page(html)) => Ok(PageContent { html }),
            Some(Step::Fail(e)) => Err(e),
            None => Ok(PageContent {
                html: self.fallback.clone(),
            }),
        }
    }
}

fn selectors() -> SelectorConfig {
    SelectorConfig {
        listing_container: "ol.listing".into(),
        slot: "li.slot".into(),
        rank: ".rank".into(),
        title: ".title".into(),
        price: ".price".into(),
        rating: ".rating".into(),
        reviews: ".reviews".into(),
        badge: ".badge".into(),
        block_markers: vec![],
    }
}

/// Config tuned for tests: no politeness or backoff delays.
fn config(max_pages: u32) -> ScrapeConfig {
    ScrapeConfig {
        max_pages,
        max_retries: 3,
        backoff_base_ms: 0,
        backoff_cap_ms: 0,
        politeness_ms: 0,
        ..ScrapeConfig::default()
    }
}

fn slot(rank: &str, title: &str) -> String {
    format!(
        r#"<li class="slot"><span class="rank">{}</span><div class="title">{}</div></li>"#,
        rank, title
    )
}

fn listing_page(slots: &[String]) -> String {
    format!(
        r#"<html><body><ol class="listing">{}</ol></body></html>"#,
        slots.concat()
    )
}

fn empty_page() -> String {
    listing_page(&[])
}

fn ranked_page(start: u32, count: u32) -> String {
    let slots: Vec<String> = (start..start + count)
        .map(|r| slot(&format!("#{}", r), &format!("Item {}", r)))
        .collect();
    listing_page(&slots)
}

fn pipeline(fetcher: ScriptedFetcher, config: ScrapeConfig) -> Pipeline<ScriptedFetcher> {
    let extractor = RecordExtractor::new(&selectors()).unwrap();
    Pipeline::new(fetcher, extractor, config)
}

#[tokio::test]
async fn timeout_twice_then_success_stays_complete() {
    // Scenario C: two timeouts under a ceiling of 3, third attempt succeeds
    let fetcher = ScriptedFetcher::new(vec![
        Step::Fail(FetchError::Timeout(30)),
        Step::Fail(FetchError::Timeout(30)),
        Step::Page(ranked_page(1, 5)),
    ]);

    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    assert_eq!(outcome.run.status, RunStatus::Complete);
    assert_eq!(outcome.records.len(), 5);
    // Page 1 after retries, page 2 empty ends the listing
    assert_eq!(outcome.run.pages_visited, 2);
}

#[tokio::test]
async fn block_after_four_pages_ends_partial_keeping_data() {
    // Scenario D
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(ranked_page(1, 10)),
        Step::Page(ranked_page(11, 10)),
        Step::Page(ranked_page(21, 10)),
        Step::Page(ranked_page(31, 10)),
        Step::Fail(FetchError::BlockedOrCaptcha),
    ]);

    let outcome = pipeline(fetcher, config(20)).run("gadgets").await;

    assert_eq!(outcome.run.status, RunStatus::Partial);
    assert_eq!(outcome.run.pages_visited, 4);
    assert_eq!(outcome.records.len(), 40);

    // The accumulated pages clean normally
    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
    let (clean, _) = Normalizer::new().normalize(&outcome.records, "gadgets", date);
    assert_eq!(clean.len(), 40);
    assert_eq!(clean.first().unwrap().rank, 1);
    assert_eq!(clean.last().unwrap().rank, 40);
}

#[tokio::test]
async fn retry_ceiling_exhaustion_ends_partial() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Fail(FetchError::Network("connection reset".into())),
        Step::Fail(FetchError::Network("connection reset".into())),
        Step::Fail(FetchError::Network("connection reset".into())),
    ]);

    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    // A run always produces an outcome, even when no page succeeded
    assert_eq!(outcome.run.status, RunStatus::Partial);
    assert_eq!(outcome.run.pages_visited, 0);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn block_is_never_retried() {
    let fetcher = ScriptedFetcher::with_fallback(
        vec![Step::Fail(FetchError::BlockedOrCaptcha)],
        ranked_page(1, 3),
    );

    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    // Had the block been retried, the fallback page would have succeeded
    assert_eq!(outcome.run.status, RunStatus::Partial);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn empty_page_ends_listing_complete() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(ranked_page(1, 3)),
        Step::Page(empty_page()),
    ]);

    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    assert_eq!(outcome.run.status, RunStatus::Complete);
    assert_eq!(outcome.run.pages_visited, 2);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test]
async fn max_page_ceiling_bounds_the_run() {
    // Listing never goes empty; the ceiling must still terminate the run
    let fetcher = ScriptedFetcher::with_fallback(vec![], ranked_page(1, 2));

    let outcome = pipeline(fetcher, config(7)).run("gadgets").await;

    assert_eq!(outcome.run.status, RunStatus::Complete);
    assert_eq!(outcome.run.pages_visited, 7);
    assert_eq!(outcome.records.len(), 14);
}

#[tokio::test]
async fn cancellation_stops_between_pages() {
    let fetcher = ScriptedFetcher::with_fallback(vec![], ranked_page(1, 2));
    let pipeline = pipeline(fetcher, config(50));

    pipeline.cancel_handle().store(true, Ordering::Relaxed);
    let outcome = pipeline.run("gadgets").await;

    // The in-flight page completes, then the run stops at DECIDE
    assert_eq!(outcome.run.pages_visited, 1);
    assert_eq!(outcome.run.status, RunStatus::Complete);
}

#[tokio::test]
async fn page_with_one_artifact_slot_yields_contiguous_ranks() {
    // Scenario A: 20 slots, one with no title and no rank
    let mut slots: Vec<String> = (1..=19)
        .map(|r| slot(&format!("#{}", r), &format!("Item {}", r)))
        .collect();
    slots.push(r#"<li class="slot"><div class="spinner"></div></li>"#.to_string());

    let fetcher = ScriptedFetcher::new(vec![Step::Page(listing_page(&slots))]);
    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    assert_eq!(outcome.records.len(), 19);

    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
    let (clean, stats) = Normalizer::new().normalize(&outcome.records, "gadgets", date);

    assert_eq!(clean.len(), 19);
    assert_eq!(stats.dropped, 0);
    let ranks: Vec<u32> = clean.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=19).collect::<Vec<u32>>());
}

#[tokio::test]
async fn duplicate_rank_across_pages_keeps_first_page() {
    let fetcher = ScriptedFetcher::new(vec![
        Step::Page(listing_page(&[slot("#3", "From page one")])),
        Step::Page(listing_page(&[slot("#3", "From page two")])),
        Step::Page(empty_page()),
    ]);

    let outcome = pipeline(fetcher, config(10)).run("gadgets").await;

    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
    let (clean, stats) = Normalizer::new().normalize(&outcome.records, "gadgets", date);

    assert_eq!(clean.len(), 1);
    assert_eq!(clean[0].title, "From page one");
    assert_eq!(stats.dropped, 1);
}
