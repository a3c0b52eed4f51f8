use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use chrono::{NaiveDate, Utc};

use crate::app::Result;
use crate::config::Config;
use crate::domain::RunStatus;
use crate::export::{self, Exporter};
use crate::extractor::RecordExtractor;
use crate::fetcher::ChromeFetcher;
use crate::normalizer::Normalizer;
use crate::pipeline::Pipeline;

pub struct ScrapeArgs {
    pub category: String,
    pub out_dir: PathBuf,
    pub url_template: Option<String>,
    pub max_pages: Option<u32>,
    pub date: Option<NaiveDate>,
    pub headed: bool,
}

pub async fn scrape(config: &Config, args: ScrapeArgs) -> Result<()> {
    let mut scrape_config = config.scrape.clone();
    if let Some(template) = args.url_template {
        scrape_config.url_template = template;
    }
    if let Some(max_pages) = args.max_pages {
        scrape_config.max_pages = max_pages;
    }
    if args.headed {
        scrape_config.headless = false;
    }

    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let extractor = RecordExtractor::new(&config.selectors)?;
    let fetcher = ChromeFetcher::launch(scrape_config.clone(), config.selectors.clone()).await?;
    let pipeline = Pipeline::new(fetcher, extractor, scrape_config);

    // Ctrl-C requests cooperative cancellation; the run stops at the next
    // page boundary with everything collected so far.
    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, finishing current page");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let outcome = pipeline.run(&args.category).await;

    // run() is infallible, so the session is released on COMPLETE and
    // PARTIAL alike.
    pipeline.into_fetcher().close().await;

    let normalizer = Normalizer::new();
    let (clean, stats) = normalizer.normalize(&outcome.records, &args.category, date);
    let run = outcome.run.with_cleaning(stats);

    let exporter = Exporter::new(&args.out_dir);
    let raw_path = exporter.write_raw(&outcome.records, &args.category, date)?;
    let clean_path = exporter.write_clean(&clean, &args.category, date)?;
    let run_path = exporter.write_run(&run, date)?;

    let status = match run.status {
        RunStatus::Complete => "COMPLETE",
        RunStatus::Partial => "PARTIAL",
    };
    println!(
        "{}: {} pages, {} extracted, {} retained, {} dropped",
        status, run.pages_visited, run.records_extracted, run.records_retained, run.records_dropped
    );
    println!("Clean dataset: {}", clean_path.display());
    println!("Raw snapshot:  {}", raw_path.display());
    println!("Run summary:   {}", run_path.display());

    Ok(())
}

pub fn clean(
    input: &Path,
    category: &str,
    date: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<()> {
    let records = export::read_raw_csv(input)?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let (clean, stats) = Normalizer::new().normalize(&records, category, date);

    let output = output.unwrap_or_else(|| default_clean_path(input));
    export::write_clean_csv(&output, &clean)?;

    println!(
        "Cleaned {} records ({} dropped) into {}",
        stats.retained,
        stats.dropped,
        output.display()
    );

    Ok(())
}

fn default_clean_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshot");
    input.with_file_name(format!("{}_clean.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clean_path_next_to_input() {
        let path = default_clean_path(Path::new("/data/gadgets_2025-10-25_raw.csv"));
        assert_eq!(
            path,
            PathBuf::from("/data/gadgets_2025-10-25_raw_clean.csv")
        );
    }
}
