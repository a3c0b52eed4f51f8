//! Output artifacts: the clean dataset CSV, a raw-records snapshot CSV, and
//! a JSON run summary. File names encode category and scrape date.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::app::Result;
use crate::domain::{CleanRecord, RawRecord, ScrapeRun};

pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write the cleaned snapshot: `<category>_<date>.csv`, header row,
    /// rows already in ascending rank order, UTF-8.
    pub fn write_clean(
        &self,
        records: &[CleanRecord],
        category: &str,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let path = self.artifact_path(category, date, ".csv")?;
        write_clean_csv(&path, records)?;
        Ok(path)
    }

    /// Write the raw snapshot alongside the clean one so it can be
    /// re-cleaned later with `ranksnap clean`.
    pub fn write_raw(
        &self,
        records: &[RawRecord],
        category: &str,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let path = self.artifact_path(category, date, "_raw.csv")?;
        write_raw_csv(&path, records)?;
        Ok(path)
    }

    /// Write the audit summary: `<category>_<date>_run.json`.
    pub fn write_run(&self, run: &ScrapeRun, date: NaiveDate) -> Result<PathBuf> {
        let path = self.artifact_path(&run.category, date, "_run.json")?;
        fs::write(&path, serde_json::to_string_pretty(run)?)?;
        Ok(path)
    }

    fn artifact_path(&self, category: &str, date: NaiveDate, suffix: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        Ok(self
            .out_dir
            .join(format!("{}_{}{}", sanitize(category), date, suffix)))
    }
}

pub fn write_clean_csv(path: &Path, records: &[CleanRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        // Keep the schema visible even when nothing was retained
        writer.write_record([
            "category",
            "rank",
            "title",
            "price",
            "rating",
            "review_count",
            "momentum_flag",
            "scrape_date",
        ])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_raw_csv(path: &Path, records: &[RawRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_raw_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Keep file names portable: lowercase alphanumerics, everything else `-`.
fn sanitize(category: &str) -> String {
    category
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
