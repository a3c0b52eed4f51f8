use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CleaningStats;

/// Immutable request for one listing page, created per pipeline iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub category: String,
    pub page: u32,
}

impl PageRequest {
    pub fn new(category: &str, page: u32) -> Self {
        debug_assert!(page >= 1);
        Self {
            category: category.to_string(),
            page,
        }
    }

    /// Build the page URL from a template with `{category}` and `{page}`
    /// placeholders.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{category}", &self.category)
            .replace("{page}", &self.page.to_string())
    }
}

/// How a run terminated. Both states hand the accumulated records onward;
/// PARTIAL never discards data collected before the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Complete,
    Partial,
}

/// Audit summary of one scrape run. Finalized at pipeline end and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRun {
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_visited: u32,
    pub records_extracted: usize,
    pub records_retained: usize,
    pub records_dropped: usize,
    pub status: RunStatus,
}

impl ScrapeRun {
    /// Fold the cleaning counts into the summary.
    pub fn with_cleaning(mut self, stats: CleaningStats) -> Self {
        self.records_retained = stats.retained;
        self.records_dropped = stats.dropped;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_template_substitution() {
        let request = PageRequest::new("electronics", 3);
        let url = request.url("https://shop.example.com/bestsellers/{category}?pg={page}");
        assert_eq!(url, "https://shop.example.com/bestsellers/electronics?pg=3");
    }

    #[test]
    fn test_run_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&RunStatus::Complete).unwrap(),
            "\"COMPLETE\""
        );
        assert_eq!(
            serde_json::to_string(&RunStatus::Partial).unwrap(),
            "\"PARTIAL\""
        );
    }
}
