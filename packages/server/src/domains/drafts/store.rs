//! Filesystem-backed draft store: one JSON document per draft.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use super::record::{DraftRecord, NewDraft};

/// Store keeping one pretty-printed JSON document per draft, filename
/// `{id}.json`, plus the screenshot directory for reclaiming capture files.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
    screenshot_dir: PathBuf,
}

impl DraftStore {
    /// Open the store, creating both directories if needed.
    pub async fn open(dir: impl Into<PathBuf>, screenshot_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let screenshot_dir = screenshot_dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create draft dir {}", dir.display()))?;
        tokio::fs::create_dir_all(&screenshot_dir)
            .await
            .with_context(|| format!("failed to create screenshot dir {}", screenshot_dir.display()))?;
        Ok(Self {
            dir,
            screenshot_dir,
        })
    }

    pub fn screenshot_path(&self, filename: &str) -> PathBuf {
        self.screenshot_dir.join(filename)
    }

    /// Persist a new draft; the id is derived from the creation timestamp.
    pub async fn create(&self, new: NewDraft) -> Result<DraftRecord> {
        let created_at = Utc::now();
        let mut id = created_at.timestamp_millis();

        // Two blocks in the same millisecond bump the id until it is free.
        while tokio::fs::try_exists(self.path_for(&id.to_string())).await? {
            id += 1;
        }

        let record = DraftRecord {
            id: id.to_string(),
            text: new.text,
            diff_url: new.diff_url,
            article: new.article,
            editor: new.editor,
            pii_types: new.pii_types,
            max_score: new.max_score,
            page_url: new.page_url,
            user_url: new.user_url,
            screenshot: new.screenshot,
            posted_to: Vec::new(),
            created_at,
        };

        self.persist(&record).await?;
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<Option<DraftRecord>> {
        if !valid_id(id) {
            return Ok(None);
        }
        let path = self.path_for(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt draft document {}", path.display()))?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// All drafts, newest first.
    pub async fn list(&self) -> Result<Vec<DraftRecord>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("failed to read draft dir {}", self.dir.display()))?;

        let mut drafts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match tokio::fs::read(&path).await {
                Ok(bytes) => match serde_json::from_slice::<DraftRecord>(&bytes) {
                    Ok(record) => drafts.push(record),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping corrupt draft document");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable draft document");
                }
            }
        }

        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(drafts)
    }

    /// Rewrite a draft document after a `posted_to` or screenshot change.
    pub async fn update(&self, record: &DraftRecord) -> Result<()> {
        self.persist(record).await
    }

    /// Remove the draft document and reclaim its screenshot file.
    ///
    /// Returns false when no such draft exists.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let Some(record) = self.get(id).await? else {
            return Ok(false);
        };

        tokio::fs::remove_file(self.path_for(id))
            .await
            .with_context(|| format!("failed to delete draft {id}"))?;

        if let Some(filename) = &record.screenshot {
            if let Err(e) = tokio::fs::remove_file(self.screenshot_path(filename)).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(filename = %filename, error = %e, "failed to reclaim screenshot");
                }
            }
        }
        Ok(true)
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn persist(&self, record: &DraftRecord) -> Result<()> {
        let path = self.path_for(&record.id);
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// Ids are timestamp-derived digit strings; anything else (and in
/// particular anything path-like) is rejected.
fn valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 20 && id.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, DraftStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = DraftStore::open(tmp.path().join("drafts"), tmp.path().join("shots"))
            .await
            .unwrap();
        (tmp, store)
    }

    fn new_draft(article: &str) -> NewDraft {
        NewDraft {
            text: format!("{article} edited"),
            diff_url: "https://en.site.org/w/index.php?diff=1".into(),
            article: article.into(),
            editor: "203.0.113.9".into(),
            pii_types: vec!["PERSON".into()],
            max_score: 0.9,
            page_url: None,
            user_url: None,
            screenshot: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let (_tmp, store) = store().await;

        let created = store.create(new_draft("Foo")).await.unwrap();
        let fetched = store.get(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.article, "Foo");
        assert_eq!(fetched.pii_types, vec!["PERSON"]);
        assert!(fetched.posted_to.is_empty());
    }

    #[tokio::test]
    async fn same_millisecond_ids_stay_unique() {
        let (_tmp, store) = store().await;

        let a = store.create(new_draft("A")).await.unwrap();
        let b = store.create(new_draft("B")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_tmp, store) = store().await;

        let first = store.create(new_draft("First")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create(new_draft("Second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn delete_reclaims_screenshot_file() {
        let (_tmp, store) = store().await;

        let mut draft = new_draft("Foo");
        draft.screenshot = Some("shot.png".into());
        let created = store.create(draft).await.unwrap();

        let shot = store.screenshot_path("shot.png");
        tokio::fs::write(&shot, b"png").await.unwrap();

        assert!(store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
        assert!(!shot.exists());
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let (_tmp, store) = store().await;
        assert!(!store.delete("1700000000000").await.unwrap());
    }

    #[tokio::test]
    async fn path_like_ids_are_rejected() {
        let (_tmp, store) = store().await;
        assert!(store.get("../../etc/passwd").await.unwrap().is_none());
        assert!(store.get("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_persists_posted_to_growth() {
        let (_tmp, store) = store().await;

        let mut record = store.create(new_draft("Foo")).await.unwrap();
        record.posted_to.push("bluesky".into());
        store.update(&record).await.unwrap();

        let fetched = store.get(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.posted_to, vec!["bluesky"]);
    }
}
