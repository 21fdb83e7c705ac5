//! Most-recently-used list of documents, persisted across restarts

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::host::FileHandle;
use super::storage::PreferenceStore;

/// Storage key of the recent-documents list
pub const RECENT_FILES_KEY: &str = "notiq-recent-files";

/// Maximum number of remembered documents
pub const RECENT_FILES_CAP: usize = 10;

/// Snapshot of a document taken when it was opened or saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<FileHandle>,
    pub last_modified: SystemTime,
}

/// Bounded, deduplicated MRU list.
///
/// Persistence is best effort: a failing store leaves the in-memory list
/// authoritative for the rest of the process.
pub struct RecentRegistry {
    entries: Vec<RecentEntry>,
    store: Box<dyn PreferenceStore>,
}

impl RecentRegistry {
    /// Load the list from `store`, starting empty if it is missing or corrupt
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let entries = match store.get(RECENT_FILES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<RecentEntry>>(&json) {
                Ok(mut entries) => {
                    dedup_by_path(&mut entries);
                    entries.truncate(RECENT_FILES_CAP);
                    entries
                }
                Err(e) => {
                    tracing::warn!("Failed to parse recent files: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load recent files: {}", e);
                Vec::new()
            }
        };

        tracing::debug!("Loaded {} recent files", entries.len());
        Self { entries, store }
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&RecentEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Move or insert `entry` at the front, evicting past the cap
    pub fn upsert(&mut self, entry: RecentEntry) {
        self.entries.retain(|e| e.path != entry.path);
        self.entries.insert(0, entry);
        self.entries.truncate(RECENT_FILES_CAP);
        self.persist();
    }

    /// Forget the entry with `path`
    pub fn remove(&mut self, path: &str) {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        if self.entries.len() != before {
            tracing::debug!("Removed recent file: {}", path);
        }
        self.persist();
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize recent files: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(RECENT_FILES_KEY, &json) {
            tracing::warn!("Failed to persist recent files: {}", e);
        }
    }
}

fn dedup_by_path(entries: &mut Vec<RecentEntry>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.path.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::core::testing::FailingStore;

    fn entry(path: &str) -> RecentEntry {
        RecentEntry {
            name: path.to_string(),
            path: path.to_string(),
            handle: None,
            last_modified: SystemTime::UNIX_EPOCH,
        }
    }

    fn paths(registry: &RecentRegistry) -> Vec<&str> {
        registry.entries().iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_upsert_same_path_keeps_single_entry_first() {
        let mut registry = RecentRegistry::load(Box::new(MemoryStore::new()));
        registry.upsert(entry("a.md"));
        registry.upsert(entry("b.md"));
        for _ in 0..5 {
            registry.upsert(entry("a.md"));
        }
        assert_eq!(paths(&registry), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut registry = RecentRegistry::load(Box::new(MemoryStore::new()));
        for i in 0..=RECENT_FILES_CAP {
            registry.upsert(entry(&format!("{i}.md")));
        }
        assert_eq!(registry.len(), RECENT_FILES_CAP);
        assert_eq!(registry.entries()[0].path, "10.md");
        assert!(registry.get("0.md").is_none());
        assert!(registry.get("1.md").is_some());
    }

    #[test]
    fn test_persists_and_reloads_in_order() {
        let store = MemoryStore::new();
        let mut registry = RecentRegistry::load(Box::new(store.clone()));
        registry.upsert(entry("a.md"));
        registry.upsert(entry("b.md"));
        registry.remove("a.md");
        registry.upsert(entry("c.md"));

        let reloaded = RecentRegistry::load(Box::new(store));
        assert_eq!(paths(&reloaded), vec!["c.md", "b.md"]);
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut registry = RecentRegistry::load(Box::new(MemoryStore::new()));
        registry.upsert(entry("a.md"));
        registry.remove("zzz.md");
        assert_eq!(paths(&registry), vec!["a.md"]);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let mut store = MemoryStore::new();
        store.set(RECENT_FILES_KEY, "{not json").unwrap();
        let registry = RecentRegistry::load(Box::new(store));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_oversized_storage_is_trimmed_and_deduplicated() {
        let mut stored: Vec<RecentEntry> = (0..15).map(|i| entry(&format!("{i}.md"))).collect();
        stored.insert(1, entry("0.md"));
        let mut store = MemoryStore::new();
        store
            .set(RECENT_FILES_KEY, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let registry = RecentRegistry::load(Box::new(store));
        assert_eq!(registry.len(), RECENT_FILES_CAP);
        assert_eq!(paths(&registry)[..2], ["0.md", "1.md"]);
    }

    #[test]
    fn test_store_failure_degrades_to_memory() {
        let mut registry = RecentRegistry::load(Box::new(FailingStore));
        registry.upsert(entry("a.md"));
        registry.upsert(entry("b.md"));
        registry.remove("a.md");
        assert_eq!(paths(&registry), vec!["b.md"]);
    }

    #[test]
    fn test_entry_json_shape() {
        let mut e = entry("/notes/a.md");
        e.handle = Some(FileHandle::new("/notes/a.md"));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["path"], "/notes/a.md");
        assert_eq!(json["handle"], "/notes/a.md");
        assert!(json.get("lastModified").is_some());

        let without_handle = serde_json::to_value(entry("b.md")).unwrap();
        assert!(without_handle.get("handle").is_none());
    }
}
