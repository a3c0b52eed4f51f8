use scraper::{ElementRef, Html, Selector};

use crate::app::{RanksnapError, Result};
use crate::config::SelectorConfig;
use crate::domain::RawRecord;
use crate::fetcher::PageContent;

/// Parses one rendered listing page into raw candidate records.
///
/// Extraction never fails at page level: each field is read independently
/// and a missing or unparsable field becomes an absent value for that field
/// only. Selectors are compiled once at construction.
pub struct RecordExtractor {
    slot: Selector,
    rank: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    reviews: Selector,
    badge: Selector,
}

impl RecordExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            slot: compile(&config.slot)?,
            rank: compile(&config.rank)?,
            title: compile(&config.title)?,
            price: compile(&config.price)?,
            rating: compile(&config.rating)?,
            reviews: compile(&config.reviews)?,
            badge: compile(&config.badge)?,
        })
    }

    /// Extract raw records from one page, in document order.
    ///
    /// Slots that yield neither a title nor a rank are layout artifacts and
    /// are dropped before returning.
    pub fn extract(&self, content: &PageContent, page: u32) -> Vec<RawRecord> {
        let document = Html::parse_document(&content.html);
        let mut records = Vec::new();

        for slot in document.select(&self.slot) {
            let mut record = RawRecord::new(page);
            record.rank_text = read_text(&slot, &self.rank);
            record.title = read_text(&slot, &self.title);
            record.price_text = read_text(&slot, &self.price);
            record.rating_text = read_text(&slot, &self.rating);
            record.reviews_text = read_text(&slot, &self.reviews);
            record.badge_text = read_text(&slot, &self.badge);

            if record.is_artifact() {
                tracing::debug!(page, "skipping empty listing slot");
                continue;
            }

            records.push(record);
        }

        records
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| RanksnapError::Selector(selector.to_string()))
}

/// First matching element's text, trimmed. None when nothing matches or the
/// text is empty.
fn read_text(slot: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = slot.select(selector).next()?;
    let text: String = element.text().collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_selectors() -> SelectorConfig {
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

    fn page(html: &str) -> PageContent {
        PageContent {
            html: html.to_string(),
        }
    }

    const LISTING_SAMPLE: &str = r#"
<html><body><ol class="listing">
  <li class="slot">
    <span class="rank">#1</span>
    <div class="title">Wireless Earbuds</div>
    <span class="price">$19.99</span>
    <span class="rating">4.5 out of 5 stars</span>
    <span class="reviews">12,345</span>
  </li>
  <li class="slot">
    <span class="rank">#2</span>
    <div class="title">USB-C Cable</div>
    <span class="badge">Mover &amp; Shaker</span>
  </li>
  <li class="slot"><div class="placeholder"></div></li>
</ol></body></html>
"#;

    #[test]
    fn test_extracts_slots_in_document_order() {
        let extractor = RecordExtractor::new(&test_selectors()).unwrap();
        let records = extractor.extract(&page(LISTING_SAMPLE), 1);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rank_text, Some("#1".into()));
        assert_eq!(records[0].title, Some("Wireless Earbuds".into()));
        assert_eq!(records[1].rank_text, Some("#2".into()));
    }

    #[test]
    fn test_missing_fields_are_absent_not_errors() {
        let extractor = RecordExtractor::new(&test_selectors()).unwrap();
        let records = extractor.extract(&page(LISTING_SAMPLE), 1);

        assert_eq!(records[0].price_text, Some("$19.99".into()));
        assert_eq!(records[0].badge_text, None);
        assert_eq!(records[1].price_text, None);
        assert_eq!(records[1].badge_text, Some("Mover & Shaker".into()));
    }

    #[test]
    fn test_empty_slot_dropped_as_artifact() {
        let extractor = RecordExtractor::new(&test_selectors()).unwrap();
        let records = extractor.extract(&page(LISTING_SAMPLE), 1);

        // Third slot has no title and no rank
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_malformed_page_yields_no_records() {
        let extractor = RecordExtractor::new(&test_selectors()).unwrap();
        let records = extractor.extract(&page("<html><body><p>nothing here"), 3);
        assert!(records.is_empty());
    }

    #[test]
    fn test_page_number_recorded_on_records() {
        let extractor = RecordExtractor::new(&test_selectors()).unwrap();
        let records = extractor.extract(&page(LISTING_SAMPLE), 7);
        assert!(records.iter().all(|r| r.page == 7));
    }

    #[test]
    fn test_invalid_selector_rejected_at_construction() {
        let mut selectors = test_selectors();
        selectors.slot = ":::".into();
        assert!(RecordExtractor::new(&selectors).is_err());
    }
}
