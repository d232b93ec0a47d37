//! Per-topic JSON record stores.
//!
//! Each topic owns one file, `<root>/<slug>/papers_info.json`, holding a JSON
//! object keyed by paper id. Stores are loaded and saved independently; there
//! is no in-memory index shared between them.
//!
//! [`PaperStore::merge`] is the only write path. It is a plain
//! load-modify-overwrite and is not safe against concurrent writers to the
//! same topic.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PaperError, Result};
use crate::models::PaperRecord;

/// File name of the metadata file inside every topic directory.
pub const STORE_FILE_NAME: &str = "papers_info.json";

/// Id → record mapping for one topic.
pub type PaperMap = BTreeMap<String, PaperRecord>;

/// Outcome of reading one topic store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreLoad {
    Loaded(PaperMap),
    /// No store file exists for the topic yet.
    Absent,
    /// The file exists but does not hold a valid mapping.
    Corrupted(String),
}

impl StoreLoad {
    /// Records of a loaded store; absent and corrupted stores are empty.
    pub fn into_records(self) -> PaperMap {
        match self {
            StoreLoad::Loaded(map) => map,
            StoreLoad::Absent | StoreLoad::Corrupted(_) => PaperMap::new(),
        }
    }
}

/// Result of a [`PaperStore::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub path: PathBuf,
    pub inserted: usize,
    pub updated: usize,
    pub total: usize,
}

/// Listing entry produced by [`PaperStore::topics`].
#[derive(Debug, Clone, Serialize)]
pub struct TopicSummary {
    /// Directory name of the topic (its slug).
    pub topic: String,
    /// `"ok"`, `"absent"`, or `"corrupted"`.
    pub status: String,
    pub papers: usize,
    pub notes: Option<String>,
}

/// Normalizes a topic label into the directory name of its store.
///
/// Lowercases the label and replaces whitespace and path separators with
/// `_`. Labels that normalize to nothing usable are rejected.
pub fn topic_slug(topic: &str) -> Result<String> {
    let slug: String = topic
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();

    if slug.is_empty() || slug == "." || slug == ".." {
        return Err(PaperError::InvalidArgument(format!(
            "topic '{}' does not produce a usable store name",
            topic
        )));
    }
    Ok(slug)
}

/// Handle on the corpus root. Cheap to clone; holds no open files.
#[derive(Debug, Clone)]
pub struct PaperStore {
    root: PathBuf,
}

impl PaperStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topic_dir(&self, topic: &str) -> Result<PathBuf> {
        Ok(self.root.join(topic_slug(topic)?))
    }

    pub fn store_path(&self, topic: &str) -> Result<PathBuf> {
        Ok(self.topic_dir(topic)?.join(STORE_FILE_NAME))
    }

    /// Reads the store for `topic`.
    ///
    /// Missing files are [`StoreLoad::Absent`] and unparseable content is
    /// [`StoreLoad::Corrupted`]; any other I/O failure is returned as an error.
    pub fn load(&self, topic: &str) -> Result<StoreLoad> {
        read_store_file(&self.store_path(topic)?)
    }

    /// Reads the store for `topic`, treating absence and corruption as empty.
    pub fn load_or_empty(&self, topic: &str) -> Result<PaperMap> {
        let path = self.store_path(topic)?;
        let load = read_store_file(&path)?;
        if let StoreLoad::Corrupted(reason) = &load {
            warn!(path = %path.display(), %reason, "corrupted store treated as empty");
        }
        Ok(load.into_records())
    }

    /// Overwrites the store for `topic` with `papers`, creating its
    /// directory if needed. Returns the path written.
    pub fn save(&self, topic: &str, papers: &PaperMap) -> Result<PathBuf> {
        let dir = self.topic_dir(topic)?;
        fs::create_dir_all(&dir).map_err(|e| PaperError::io(&dir, e))?;

        let path = dir.join(STORE_FILE_NAME);
        let json = serde_json::to_string_pretty(papers)?;
        fs::write(&path, json).map_err(|e| PaperError::io(&path, e))?;
        debug!(path = %path.display(), papers = papers.len(), "store saved");
        Ok(path)
    }

    /// Loads the store, upserts `records` by id (last write wins), and saves.
    pub fn merge(
        &self,
        topic: &str,
        records: impl IntoIterator<Item = PaperRecord>,
    ) -> Result<MergeSummary> {
        let mut papers = self.load_or_empty(topic)?;
        let mut inserted = 0;
        let mut updated = 0;

        for record in records {
            match papers.insert(record.id.clone(), record) {
                Some(_) => updated += 1,
                None => inserted += 1,
            }
        }

        let path = self.save(topic, &papers)?;
        Ok(MergeSummary {
            path,
            inserted,
            updated,
            total: papers.len(),
        })
    }

    /// Names of all topic directories under the root, sorted.
    ///
    /// A missing root is an empty corpus. Entries that are not directories
    /// (after following symlinks) are ignored, as are names that are not
    /// valid UTF-8.
    pub fn topic_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PaperError::io(&self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PaperError::io(&self.root, e))?;
            // Follows symlinks: a linked topic directory is a topic.
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    warn!(
                        name = ?raw,
                        root = %self.root.display(),
                        "skipping topic directory with a non UTF-8 name"
                    );
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads the store inside an existing topic directory by its slug.
    pub fn load_topic_dir(&self, slug: &str) -> Result<StoreLoad> {
        read_store_file(&self.root.join(slug).join(STORE_FILE_NAME))
    }

    /// Status and record count of every topic store.
    pub fn topics(&self) -> Result<Vec<TopicSummary>> {
        let mut summaries = Vec::new();
        for name in self.topic_names()? {
            let summary = match self.load_topic_dir(&name) {
                Ok(StoreLoad::Loaded(map)) => TopicSummary {
                    topic: name,
                    status: "ok".to_string(),
                    papers: map.len(),
                    notes: None,
                },
                Ok(StoreLoad::Absent) => TopicSummary {
                    topic: name,
                    status: "absent".to_string(),
                    papers: 0,
                    notes: Some(format!("no {}", STORE_FILE_NAME)),
                },
                Ok(StoreLoad::Corrupted(reason)) => TopicSummary {
                    topic: name,
                    status: "corrupted".to_string(),
                    papers: 0,
                    notes: Some(reason),
                },
                Err(e) => TopicSummary {
                    topic: name,
                    status: "unreadable".to_string(),
                    papers: 0,
                    notes: Some(e.to_string()),
                },
            };
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

fn read_store_file(path: &Path) -> Result<StoreLoad> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreLoad::Absent),
        Err(e) => return Err(PaperError::io(path, e)),
    };

    match serde_json::from_slice::<PaperMap>(&bytes) {
        Ok(mut map) => {
            for (id, record) in map.iter_mut() {
                record.id = id.clone();
            }
            Ok(StoreLoad::Loaded(map))
        }
        Err(e) => Ok(StoreLoad::Corrupted(e.to_string())),
    }
}
