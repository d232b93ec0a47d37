//! Cross-topic lookup of a single paper by id.
//!
//! There is no global id → topic index. [`resolve_paper`] scans every topic
//! store under the corpus root in sorted order and returns the first match.

use anyhow::Result as AnyResult;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::PaperRecord;
use crate::store::{PaperStore, StoreLoad};

/// Outcome of a lookup. Not finding a paper is a normal result.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found { topic: String, record: PaperRecord },
    NotFound { id: String },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    /// Caller-facing text: the stored record as pretty JSON, or a
    /// not-found message.
    pub fn render(&self) -> Result<String> {
        match self {
            Resolution::Found { record, .. } => Ok(serde_json::to_string_pretty(record)?),
            Resolution::NotFound { id } => Ok(not_found_message(id)),
        }
    }
}

pub fn not_found_message(id: &str) -> String {
    format!("There's no saved information related to paper {}.", id)
}

/// Finds `id` in any topic store.
///
/// Stores that are corrupted or unreadable are skipped with a warning. A
/// missing corpus root resolves to [`Resolution::NotFound`].
pub fn resolve_paper(store: &PaperStore, id: &str) -> Result<Resolution> {
    for topic in store.topic_names()? {
        let mut papers = match store.load_topic_dir(&topic) {
            Ok(StoreLoad::Loaded(papers)) => papers,
            Ok(StoreLoad::Absent) => continue,
            Ok(StoreLoad::Corrupted(reason)) => {
                warn!(topic = %topic, %reason, "skipping corrupted store");
                continue;
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "skipping unreadable store");
                continue;
            }
        };

        if let Some(record) = papers.remove(id) {
            debug!(id, topic = %topic, "paper resolved");
            return Ok(Resolution::Found { topic, record });
        }
    }

    Ok(Resolution::NotFound { id: id.to_string() })
}

/// CLI entry point: resolves `id` and prints the rendered result.
pub fn run_info(store: &PaperStore, id: &str) -> AnyResult<()> {
    let resolution = resolve_paper(store, id)?;
    println!("{}", resolution.render()?);
    Ok(())
}
