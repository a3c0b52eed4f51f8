use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{CleanRecord, CleaningStats, RawRecord};

/// Badge wording that marks a fast mover. Matched case-insensitively as
/// substrings.
const MOMENTUM_MARKERS: [&str; 5] = ["mover", "shaker", "trending", "rising", "hot"];

/// Converts raw heterogeneous records into typed, schema-conforming rows.
///
/// `normalize` is a pure function of its inputs: no side effects, fully
/// deterministic, and idempotent given the same raw input.
#[derive(Clone)]
pub struct Normalizer {
    leading_int: Regex,
    decimal: Regex,
    parenthetical: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            leading_int: Regex::new(r"(\d[\d,]*)").expect("static regex"),
            decimal: Regex::new(r"\d+(?:\.\d+)?").expect("static regex"),
            parenthetical: Regex::new(r"\(.*?\)").expect("static regex"),
        }
    }

    /// Clean one run's accumulated records.
    ///
    /// Policies:
    /// - title is mandatory: empty after trimming drops the record
    /// - rank comes from the rank text; absent rank falls back to one past
    ///   the highest rank assigned so far (first-seen page order)
    /// - duplicate ranks keep the first occurrence in page order
    /// - price/rating/review_count become typed values or None, never raw text
    /// - output is sorted ascending by rank
    pub fn normalize(
        &self,
        records: &[RawRecord],
        category: &str,
        scrape_date: NaiveDate,
    ) -> (Vec<CleanRecord>, CleaningStats) {
        let mut seen_ranks: HashSet<u32> = HashSet::new();
        let mut highest_rank = 0u32;
        let mut out = Vec::new();
        let mut dropped = 0usize;

        for raw in records {
            let title = raw.title.as_deref().map(str::trim).unwrap_or("");
            if title.is_empty() {
                dropped += 1;
                continue;
            }

            let rank = match raw.rank_text.as_deref().and_then(|t| self.parse_rank(t)) {
                Some(rank) => rank,
                None => highest_rank + 1,
            };

            if !seen_ranks.insert(rank) {
                // Duplicate rank: first seen in page order wins
                dropped += 1;
                continue;
            }
            highest_rank = highest_rank.max(rank);

            out.push(CleanRecord {
                category: category.to_string(),
                rank,
                title: title.to_string(),
                price: raw.price_text.as_deref().and_then(|t| self.parse_price(t)),
                rating: raw.rating_text.as_deref().and_then(|t| self.parse_rating(t)),
                review_count: raw
                    .reviews_text
                    .as_deref()
                    .and_then(|t| self.parse_review_count(t)),
                momentum_flag: raw.badge_text.as_deref().map_or(false, is_momentum),
                scrape_date,
            });
        }

        out.sort_by_key(|r| r.rank);

        let stats = CleaningStats {
            retained: out.len(),
            dropped,
        };
        (out, stats)
    }

    /// Leading integer from rank text like `#3`, `3.` or `1,024`.
    /// Zero is not a valid rank.
    fn parse_rank(&self, text: &str) -> Option<u32> {
        let digits = self.leading_int.captures(text)?.get(1)?.as_str().replace(',', "");
        digits.parse::<u32>().ok().filter(|r| *r >= 1)
    }

    /// Price as a non-negative decimal. Currency symbols, thousands
    /// separators, and parenthetical annotations like "(converted)" are
    /// stripped; an explicit "N/A" or anything unparsable becomes None.
    fn parse_price(&self, text: &str) -> Option<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        if matches!(lower.as_str(), "n/a" | "na" | "none" | "nan") {
            return None;
        }

        let without_notes = self.parenthetical.replace_all(trimmed, "");
        let cleaned: String = without_notes
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        let value: f64 = cleaned.parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(value)
    }

    /// First decimal in rating text like "4.5 out of 5 stars". Values
    /// outside [0, 5] are treated as unparsable.
    fn parse_rating(&self, text: &str) -> Option<f64> {
        let value: f64 = self.decimal.find(text)?.as_str().parse().ok()?;
        (0.0..=5.0).contains(&value).then_some(value)
    }

    /// Review count with thousands separators and "+" suffixes stripped.
    fn parse_review_count(&self, text: &str) -> Option<u64> {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

fn is_momentum(badge: &str) -> bool {
    let lower = badge.to_lowercase();
    MOMENTUM_MARKERS.iter().any(|marker| lower.contains(marker))
}
