//! JSON file draft store.
//!
//! All drafts live in a single `drafts.json` map keyed by draft id, next to
//! the configuration file.

use super::{DraftStore, PostDraft};
use crate::config::{get_config_dir, write_json_atomic};
use crate::error::{Error, Result};
use chrono::Utc;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Draft file name inside the config directory
pub const DRAFTS_FILE_NAME: &str = "drafts.json";

type DraftMap = BTreeMap<String, PostDraft>;

/// Draft store backed by one JSON file.
///
/// Reads and writes are serialized through a mutex so the UI thread and the
/// backend can both touch the file.
#[derive(Debug)]
pub struct JsonDraftStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonDraftStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store in the platform config directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_config_dir()?.join(DRAFTS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<DraftMap> {
        if !self.path.exists() {
            return Ok(DraftMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.store_error(e))?;
        if contents.trim().is_empty() {
            return Ok(DraftMap::new());
        }

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                // Move the unreadable file aside before the next write replaces it
                let quarantine = self.quarantine_path();
                fs::rename(&self.path, &quarantine).map_err(|err| self.store_error(err))?;
                warn!(
                    "Draft file {} is corrupted ({}), moved to {}; starting empty",
                    self.path.display(),
                    e,
                    quarantine.display()
                );
                Ok(DraftMap::new())
            }
        }
    }

    /// `drafts.json.corrupt-<timestamp>` next to the store.
    fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%d%H%M%S%3f")));
        PathBuf::from(name)
    }

    fn write_map(&self, map: &DraftMap) -> Result<()> {
        write_json_atomic(&self.path, map).map_err(|source| Error::DraftStore {
            path: self.path.clone(),
            source,
        })
    }

    fn store_error(&self, err: std::io::Error) -> Error {
        Error::DraftStore {
            path: self.path.clone(),
            source: Box::new(err),
        }
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Application("Draft store lock poisoned".to_string()))?;
        f()
    }
}

impl DraftStore for JsonDraftStore {
    fn load_all(&self) -> Result<Vec<PostDraft>> {
        self.with_lock(|| {
            let mut drafts: Vec<PostDraft> = self.read_map()?.into_values().collect();
            drafts.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
            Ok(drafts)
        })
    }

    fn get(&self, id: &str) -> Result<Option<PostDraft>> {
        self.with_lock(|| Ok(self.read_map()?.remove(id)))
    }

    fn save(&self, draft: &PostDraft) -> Result<()> {
        if draft.id.is_empty() {
            return Err(Error::MissingField("draftId"));
        }
        self.with_lock(|| {
            let mut map = self.read_map()?;
            map.insert(draft.id.clone(), draft.clone());
            self.write_map(&map)?;
            debug!("Saved draft {}", draft.id);
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.with_lock(|| {
            let mut map = self.read_map()?;
            if map.remove(id).is_some() {
                self.write_map(&map)?;
                debug!("Deleted draft {}", id);
            }
            Ok(())
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonDraftStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonDraftStore::new(temp_dir.path().join("nested").join(DRAFTS_FILE_NAME));
        (temp_dir, store)
    }

    fn draft(id: &str, updated: i64) -> PostDraft {
        PostDraft {
            id: id.to_string(),
            title: format!("Draft {}", id),
            last_updated: updated,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_store() {
        let (_dir, store) = store();
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_save_get_and_overwrite() {
        let (_dir, store) = store();
        let mut d = draft("a", 1);
        store.save(&d).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(d.clone()));

        d.body = "changed".to_string();
        store.save(&d).unwrap();
        assert_eq!(store.get("a").unwrap().unwrap().body, "changed");
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_load_all_most_recent_first() {
        let (_dir, store) = store();
        store.save(&draft("old", 10)).unwrap();
        store.save(&draft("new", 30)).unwrap();
        store.save(&draft("mid", 20)).unwrap();

        let ids: Vec<String> = store.load_all().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        store.save(&draft("a", 1)).unwrap();
        store.save(&draft("b", 2)).unwrap();
        store.delete("a").unwrap();
        store.delete("never-existed").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.get("b").unwrap().is_some());
    }

    #[test]
    fn test_save_without_id_is_rejected() {
        let (_dir, store) = store();
        let result = store.save(&PostDraft::default());
        assert!(matches!(result, Err(Error::MissingField("draftId"))));
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ broken").unwrap();

        assert!(store.load_all().unwrap().is_empty());
        store.save(&draft("a", 1)).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupted_file_is_kept_aside_on_save() {
        let (_dir, store) = store();
        let dir = store.path().parent().unwrap().to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        let truncated = r#"{"a":{"id":"a","title":"A","body":"hours of work"},"b":{"id":"b""#;
        fs::write(store.path(), truncated).unwrap();

        store.save(&draft("c", 3)).unwrap();

        let kept: Vec<PathBuf> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("drafts.json.corrupt-")
            })
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read_to_string(&kept[0]).unwrap(), truncated);

        let ids: Vec<String> = store.load_all().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_persists_across_instances() {
        let (_dir, store) = store();
        store.save(&draft("a", 1)).unwrap();
        let reopened = JsonDraftStore::new(store.path().to_path_buf());
        assert_eq!(reopened.get("a").unwrap().unwrap().title, "Draft a");
    }
}
