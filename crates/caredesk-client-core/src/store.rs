use std::collections::HashMap;
use std::sync::Mutex;

/// Storage key for the staff role tag written at enrollment time.
pub const KEY_ROLE_TAG: &str = "staff_role_tag";
/// Storage key for the most recently issued access token.
pub const KEY_ACCESS_TOKEN: &str = "staff_access_token";
/// Storage key for the serialized supervisor settings.
pub const KEY_SETTINGS: &str = "supervisor_settings";

/// Browser-local-storage shaped persistence seam. Writers are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local store used by tests and headless runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_round_trips_values() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(KEY_ROLE_TAG), None);

        store.set(KEY_ROLE_TAG, "patient_supervisor");
        assert_eq!(store.get(KEY_ROLE_TAG), Some("patient_supervisor".to_string()));

        store.set(KEY_ROLE_TAG, "front_desk");
        assert_eq!(store.get(KEY_ROLE_TAG), Some("front_desk".to_string()));

        store.remove(KEY_ROLE_TAG);
        assert_eq!(store.get(KEY_ROLE_TAG), None);
    }
}
