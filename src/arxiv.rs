//! Literature-search provider abstraction and the arXiv implementation.
//!
//! [`PaperSource`] is the seam between the topic search adapter and the
//! remote index. [`ArxivClient`] queries the arXiv Atom API and turns each
//! `<entry>` into a [`SearchHit`]; ranking, rate limiting, and availability
//! are the remote service's concern.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::config::ArxivConfig;
use crate::error::{PaperError, Result};
use crate::models::SearchHit;

/// A literature index that returns hits ranked by relevance to a query.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Returns at most `max_results` hits for `query`, best match first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Client for the arXiv query API (`export.arxiv.org/api/query`).
pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new(config: &ArxivConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaperError::Upstream(format!(
                "arXiv API returned HTTP {}",
                status
            )));
        }

        let body = response.text().await?;
        let hits = parse_atom_feed(&body)?;
        debug!(query, hits = hits.len(), "arXiv feed parsed");
        Ok(hits)
    }
}

/// Entry fields accumulated while walking the feed.
#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    pdf_url: Option<String>,
}

impl EntryBuilder {
    fn finish(self) -> Result<SearchHit> {
        let entry_id = self.id.trim();
        if entry_id.contains("/api/errors") {
            return Err(PaperError::Upstream(format!(
                "arXiv API error: {}",
                collapse_whitespace(&self.summary)
            )));
        }

        let id = short_id(entry_id);
        if id.is_empty() {
            return Err(PaperError::Upstream("feed entry without an id".to_string()));
        }

        let published = DateTime::parse_from_rfc3339(self.published.trim())
            .map_err(|e| {
                PaperError::Upstream(format!(
                    "entry {} has malformed published date '{}': {}",
                    id, self.published, e
                ))
            })?
            .with_timezone(&Utc);

        let pdf_url = self
            .pdf_url
            .unwrap_or_else(|| format!("https://arxiv.org/pdf/{}", id));

        Ok(SearchHit {
            id,
            title: collapse_whitespace(&self.title),
            authors: self.authors,
            summary: self.summary.trim().to_string(),
            pdf_url,
            published,
        })
    }
}

/// Reduces an entry id such as `http://arxiv.org/abs/2301.07041v1` to
/// `2301.07041v1`. Old-style ids keep their archive prefix
/// (`math.AG/0601001v1`).
pub fn short_id(entry_id: &str) -> String {
    match entry_id.split_once("/abs/") {
        Some((_, rest)) => rest.to_string(),
        None => entry_id.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn pdf_link(e: &BytesStart) -> Option<String> {
    let mut is_pdf = false;
    let mut href = None;
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"title" => is_pdf = attr.value.as_ref() == b"pdf",
            b"href" => href = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            _ => {}
        }
    }
    if is_pdf {
        href
    } else {
        None
    }
}

/// Parses an arXiv Atom feed into hits, preserving entry and author order.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<SearchHit>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut hits = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<EntryBuilder> = None;
    let mut author_name = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"entry" {
                    current = Some(EntryBuilder::default());
                } else if name == b"author" {
                    author_name.clear();
                } else if name == b"link" {
                    if let (Some(entry), Some(href)) = (current.as_mut(), pdf_link(&e)) {
                        entry.pdf_url.get_or_insert(href);
                    }
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let (Some(entry), Some(href)) = (current.as_mut(), pdf_link(&e)) {
                        entry.pdf_url.get_or_insert(href);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                let text = t
                    .unescape()
                    .map_err(|e| PaperError::Upstream(format!("malformed arXiv feed: {}", e)))?;

                // Only direct children of <entry> (and <author><name>) count.
                let depth = stack.len();
                let parent = depth.checked_sub(2).and_then(|i| stack.get(i));
                let element = stack.last();
                match (parent.map(Vec::as_slice), element.map(Vec::as_slice)) {
                    (Some(b"entry"), Some(b"id")) => entry.id.push_str(&text),
                    (Some(b"entry"), Some(b"title")) => entry.title.push_str(&text),
                    (Some(b"entry"), Some(b"summary")) => entry.summary.push_str(&text),
                    (Some(b"entry"), Some(b"published")) => entry.published.push_str(&text),
                    (Some(b"author"), Some(b"name")) => author_name.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"author" {
                    if let Some(entry) = current.as_mut() {
                        let author = collapse_whitespace(&author_name);
                        if !author.is_empty() {
                            entry.authors.push(author);
                        }
                    }
                } else if name.as_ref() == b"entry" {
                    if let Some(entry) = current.take() {
                        hits.push(entry.finish()?);
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PaperError::Upstream(format!(
                    "malformed arXiv feed at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(hits)
}
