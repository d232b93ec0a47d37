//! Core data models: raw search hits and the normalized records persisted
//! in topic stores.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw hit returned by a [`PaperSource`](crate::arxiv::PaperSource) before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub pdf_url: String,
    pub published: DateTime<Utc>,
}

/// Normalized metadata for one paper, as stored in `papers_info.json`.
///
/// The `id` is the key of the store mapping rather than part of the stored
/// value; [`PaperStore::load`](crate::store::PaperStore::load) fills it back
/// in from the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    #[serde(rename = "pdf_url")]
    pub source_url: String,
    /// Serialized as `YYYY-MM-DD`.
    pub published: NaiveDate,
}

impl From<SearchHit> for PaperRecord {
    fn from(hit: SearchHit) -> Self {
        PaperRecord {
            id: hit.id,
            title: hit.title,
            authors: hit.authors,
            summary: hit.summary,
            source_url: hit.pdf_url,
            published: hit.published.date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hit_conversion_drops_time_of_day() {
        let hit = SearchHit {
            id: "2301.07041v1".to_string(),
            title: "Title".to_string(),
            authors: vec!["B. Author".to_string(), "A. Author".to_string()],
            summary: "Abstract".to_string(),
            pdf_url: "https://arxiv.org/pdf/2301.07041v1".to_string(),
            published: Utc.with_ymd_and_hms(2023, 1, 17, 23, 59, 59).unwrap(),
        };
        let record = PaperRecord::from(hit);
        assert_eq!(record.published, NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
        assert_eq!(record.authors, vec!["B. Author", "A. Author"]);
    }

    #[test]
    fn stored_shape_uses_pdf_url_and_iso_date() {
        let record = PaperRecord {
            id: "x".to_string(),
            title: "T".to_string(),
            authors: vec![],
            summary: "S".to_string(),
            source_url: "https://arxiv.org/pdf/x".to_string(),
            published: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["pdf_url"], "https://arxiv.org/pdf/x");
        assert_eq!(value["published"], "2024-02-09");
        assert!(value.get("id").is_none());
    }
}
