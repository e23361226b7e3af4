use std::sync::Arc;

use tracing::warn;

use crate::storage::{KeyValueStore, keys, load_json, save_json};

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most recent first, without duplicates.
pub struct RecentSearches {
    entries: Vec<String>,
    store: Arc<dyn KeyValueStore>,
}

impl RecentSearches {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match load_json::<Vec<String>>(store.as_ref(), keys::RECENT_SEARCHES) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable recent searches");
                Vec::new()
            }
        };
        let mut recent = Self { entries, store };
        recent.entries.truncate(MAX_RECENT_SEARCHES);
        recent
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);
        if let Err(e) = save_json(self.store.as_ref(), keys::RECENT_SEARCHES, &self.entries) {
            warn!(error = %e, "Failed to persist recent searches");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(keys::RECENT_SEARCHES) {
            warn!(error = %e, "Failed to clear recent searches");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn newest_first_without_duplicates() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut recent = RecentSearches::load(store);

        recent.record("jazz");
        recent.record("rock");
        recent.record("jazz");

        assert_eq!(recent.entries(), ["jazz", "rock"]);
    }

    #[test]
    fn keeps_at_most_five() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut recent = RecentSearches::load(store);
        for q in ["a", "b", "c", "d", "e", "f"] {
            recent.record(q);
        }

        assert_eq!(recent.entries(), ["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn blank_queries_are_not_recorded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut recent = RecentSearches::load(store);
        recent.record("   ");
        assert!(recent.entries().is_empty());
    }

    #[test]
    fn persisted_between_loads_and_cleared() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut recent = RecentSearches::load(store.clone());
        recent.record("ambient");

        let mut reloaded = RecentSearches::load(store.clone());
        assert_eq!(reloaded.entries(), ["ambient"]);

        reloaded.clear();
        assert_eq!(store.get(keys::RECENT_SEARCHES).unwrap(), None);
    }
}
