//! Append-only paged record files (JSONL).
//!
//! A record file is a sequence of independently parseable JSON objects, one
//! per line, identified by an opaque filename handle. Nodes pass filenames
//! around through the state store; only this component interprets their
//! contents. `load` is a pure repeatable read — callers paginate by
//! iterating with increasing offsets until `has_more` is false.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// One page of records plus a continuation flag.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<Value>,
    pub has_more: bool,
}

/// Paged record store scoped to one run's data directory.
#[derive(Debug, Clone)]
pub struct PagedStore {
    data_dir: PathBuf,
}

impl PagedStore {
    /// Create a store rooted at `data_dir`. The directory is created lazily
    /// on first append.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Reject filenames that could escape the run's data directory.
    ///
    /// Filenames are opaque handles like "emails.jsonl" — never paths.
    fn resolve(&self, filename: &str) -> Result<PathBuf, StoreError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StoreError::InvalidFilename(filename.to_string()));
        }
        Ok(self.data_dir.join(filename))
    }

    /// Append one record to `filename`, creating the file if absent.
    pub async fn append(&self, filename: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.resolve(filename)?;
        fs::create_dir_all(&self.data_dir).await?;

        let mut line = serde_json::to_string(record)
            .map_err(|e| StoreError::MalformedRecord {
                filename: filename.to_string(),
                line: 0,
                reason: e.to_string(),
            })?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(filename, "Appended record");
        Ok(())
    }

    /// Load up to `limit` records starting at `offset` (in append order).
    ///
    /// An offset beyond the end of the file returns an empty page with
    /// `has_more = false` — pagination exhaustion is not an error.
    pub async fn load(
        &self,
        filename: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page, StoreError> {
        let path = self.resolve(filename)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::FileNotFound(filename.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        let mut has_more = false;
        let mut seen = 0usize;

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if seen < offset {
                seen += 1;
                continue;
            }
            if records.len() == limit {
                has_more = true;
                break;
            }
            let record: Value =
                serde_json::from_str(line).map_err(|e| StoreError::MalformedRecord {
                    filename: filename.to_string(),
                    line: idx + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
            seen += 1;
        }

        tracing::debug!(
            filename,
            offset,
            returned = records.len(),
            has_more,
            "Loaded page"
        );
        Ok(Page { records, has_more })
    }

    /// Total record count in `filename` (used by reporting and tests).
    pub async fn count(&self, filename: &str) -> Result<usize, StoreError> {
        let path = self.resolve(filename)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::FileNotFound(filename.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(content.lines().filter(|l| !l.trim().is_empty()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, PagedStore) {
        let dir = TempDir::new().unwrap();
        let store = PagedStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn append_then_load_round_trip() {
        let (_dir, store) = store();
        store
            .append("emails.jsonl", &json!({"id": "m1", "subject": "hi"}))
            .await
            .unwrap();
        store
            .append("emails.jsonl", &json!({"id": "m2", "subject": "yo"}))
            .await
            .unwrap();

        let page = store.load("emails.jsonl", 10, 0).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.records[0]["id"], "m1");
        assert_eq!(page.records[1]["id"], "m2");
    }

    #[tokio::test]
    async fn load_is_repeatable() {
        let (_dir, store) = store();
        for i in 0..5 {
            store
                .append("f.jsonl", &json!({"i": i}))
                .await
                .unwrap();
        }
        let first = store.load("f.jsonl", 2, 1).await.unwrap();
        let second = store.load("f.jsonl", 2, 1).await.unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.has_more, second.has_more);
    }

    #[tokio::test]
    async fn pagination_covers_full_set_without_gaps() {
        let (_dir, store) = store();
        for i in 0..23 {
            store.append("f.jsonl", &json!({"i": i})).await.unwrap();
        }

        let mut collected = Vec::new();
        let mut offset = 0;
        loop {
            let page = store.load("f.jsonl", 10, offset).await.unwrap();
            offset += page.records.len();
            collected.extend(page.records);
            if !page.has_more {
                break;
            }
        }

        assert_eq!(collected.len(), 23);
        for (i, record) in collected.iter().enumerate() {
            assert_eq!(record["i"], i);
        }
    }

    #[tokio::test]
    async fn offset_beyond_end_returns_empty_page() {
        let (_dir, store) = store();
        store.append("f.jsonl", &json!({"i": 0})).await.unwrap();

        let page = store.load("f.jsonl", 10, 100).await.unwrap();
        assert!(page.records.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn exact_boundary_has_no_more() {
        let (_dir, store) = store();
        for i in 0..10 {
            store.append("f.jsonl", &json!({"i": i})).await.unwrap();
        }
        let page = store.load("f.jsonl", 10, 0).await.unwrap();
        assert_eq!(page.records.len(), 10);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let (_dir, store) = store();
        let result = store.load("nope.jsonl", 10, 0).await;
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn path_like_filenames_are_rejected() {
        let (_dir, store) = store();
        for bad in ["../escape.jsonl", "a/b.jsonl", ""] {
            let result = store.append(bad, &json!({})).await;
            assert!(
                matches!(result, Err(StoreError::InvalidFilename(_))),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn count_matches_appends() {
        let (_dir, store) = store();
        for i in 0..7 {
            store.append("f.jsonl", &json!({"i": i})).await.unwrap();
        }
        assert_eq!(store.count("f.jsonl").await.unwrap(), 7);
    }
}
