//! # ranksnap
//!
//! A scrape-to-clean pipeline for ranked e-commerce category pages.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline → Fetcher → Extractor → raw buffer → Normalizer → Exporter
//! ```
//!
//! - [`fetcher`]: headless-Chrome page fetcher with bounded readiness waits
//! - [`extractor`]: selector-driven extraction of raw listing records
//! - [`pipeline`]: pagination controller with retry/backoff and politeness
//! - [`normalizer`]: pure raw-to-clean conversion with dedup and ordering
//! - [`export`]: CSV dataset and JSON run-summary artifacts
//!
//! ## Quick Start
//!
//! ```bash
//! # Scrape one category snapshot
//! ranksnap scrape electronics --max-pages 5 --out-dir out
//!
//! # Re-clean a previously written raw snapshot
//! ranksnap clean out/electronics_2025-10-25_raw.csv --category electronics
//! ```

/// Crate error type and `Result` alias.
pub mod app;

/// Command-line interface using clap.
///
/// - `scrape <category>` - run the full pipeline for one category
/// - `clean <input.csv>` - re-run the cleaner over a raw snapshot
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/ranksnap/config.toml`: scrape policy (retry
/// ceiling, backoff, politeness, page ceiling) and page selectors.
pub mod config;

/// Core domain models.
///
/// - [`RawRecord`](domain::RawRecord): one listing slot, every field optional
/// - [`CleanRecord`](domain::CleanRecord): one typed, schema-conforming row
/// - [`ScrapeRun`](domain::ScrapeRun): per-run audit summary
pub mod domain;

/// Output artifacts: clean CSV, raw CSV, run-summary JSON.
pub mod export;

/// Selector-driven record extraction from rendered pages.
pub mod extractor;

/// Page fetching via headless Chrome.
///
/// - [`PageFetcher`](fetcher::PageFetcher): async trait at the session seam
/// - [`ChromeFetcher`](fetcher::ChromeFetcher): chromiumoxide implementation
/// - [`FetchError`](fetcher::FetchError): Timeout / BlockedOrCaptcha / Network
pub mod fetcher;

/// Raw-to-clean normalization.
pub mod normalizer;

/// Pagination controller: FETCH → EXTRACT → DECIDE per page.
pub mod pipeline;
