use crate::store::{PreferenceStore, keys};

pub const MAX_HISTORY: usize = 10;

/// Recently searched cities, most recent first, persisted under `search-history`.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    store: PreferenceStore,
}

impl SearchHistory {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Vec<String> {
        self.store.get_json(keys::SEARCH_HISTORY).unwrap_or_default()
    }

    /// Move `city` to the front, dropping an exact duplicate and anything past the cap.
    pub fn record(&self, city: &str) -> Vec<String> {
        let city = city.trim();
        if city.is_empty() {
            return self.entries();
        }

        let mut entries = self.entries();
        entries.retain(|c| c != city);
        entries.insert(0, city.to_string());
        entries.truncate(MAX_HISTORY);

        self.store.set_json(keys::SEARCH_HISTORY, &entries);
        entries
    }

    pub fn clear(&self) {
        self.store.remove(keys::SEARCH_HISTORY);
    }
}
