use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One listing slot as read off the page. Every field is optional:
/// absence is a value, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub rank_text: Option<String>,
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub rating_text: Option<String>,
    pub reviews_text: Option<String>,
    pub badge_text: Option<String>,
    pub page: u32,
    pub extracted_at: DateTime<Utc>,
}

impl RawRecord {
    pub fn new(page: u32) -> Self {
        Self {
            rank_text: None,
            title: None,
            price_text: None,
            rating_text: None,
            reviews_text: None,
            badge_text: None,
            page,
            extracted_at: Utc::now(),
        }
    }

    /// A slot with neither title nor rank is a layout artifact, not data.
    pub fn is_artifact(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.title) && blank(&self.rank_text)
    }
}

/// One schema-conforming row of the cleaned snapshot. Field order matches
/// the output CSV schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub category: String,
    pub rank: u32,
    pub title: String,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub momentum_flag: bool,
    pub scrape_date: NaiveDate,
}

/// Record-level cleaning outcome, reported in the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub retained: usize,
    pub dropped: usize,
}
