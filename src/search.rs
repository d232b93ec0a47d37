//! Topic search: query the provider, normalize hits, merge them into the
//! topic's store.
//!
//! Used by both the `papers search` CLI command and the `search_papers` tool.

use anyhow::Result as AnyResult;
use tracing::info;

use crate::arxiv::PaperSource;
use crate::error::{PaperError, Result};
use crate::models::PaperRecord;
use crate::store::{topic_slug, PaperStore};

/// Number of hits requested when the caller does not say.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Searches `source` for `topic` and stores every hit under that topic.
///
/// Returns the ids of all hits in the order the provider ranked them,
/// including ids that were already stored. Nothing is written if the
/// provider fails.
pub async fn search_papers(
    store: &PaperStore,
    source: &dyn PaperSource,
    topic: &str,
    max_results: usize,
) -> Result<Vec<String>> {
    if topic.trim().is_empty() {
        return Err(PaperError::InvalidArgument(
            "topic must not be empty".to_string(),
        ));
    }
    if max_results < 1 {
        return Err(PaperError::InvalidArgument(
            "max_results must be >= 1".to_string(),
        ));
    }
    let slug = topic_slug(topic)?;

    let hits = source.search(topic, max_results).await?;

    let ids: Vec<String> = hits.iter().map(|hit| hit.id.clone()).collect();
    let records: Vec<PaperRecord> = hits.into_iter().map(PaperRecord::from).collect();
    let summary = store.merge(topic, records)?;

    info!(
        topic,
        slug = %slug,
        source = source.name(),
        hits = ids.len(),
        inserted = summary.inserted,
        updated = summary.updated,
        path = %summary.path.display(),
        "search results saved"
    );

    Ok(ids)
}

/// CLI entry point: runs the search and prints one id per line.
pub async fn run_search(
    store: &PaperStore,
    source: &dyn PaperSource,
    topic: &str,
    max_results: usize,
) -> AnyResult<()> {
    let ids = search_papers(store, source, topic, max_results).await?;

    if ids.is_empty() {
        println!("No results.");
    }
    for id in &ids {
        println!("{}", id);
    }
    println!();
    println!("Results are saved in: {}", store.store_path(topic)?.display());

    Ok(())
}
