use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use caredesk_client_core::store::KeyValueStore;

/// JSON-file key-value store standing in for browser local storage. The
/// whole map is rewritten on every mutation; values are small.
#[derive(Debug)]
pub struct FileBackedStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileBackedStore {
    pub fn open(path: &Path) -> io::Result<Self> {
        let values = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(error) if error.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(error),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    fn flush(&self, values: &HashMap<String, String>) {
        match serde_json::to_string_pretty(values) {
            Ok(raw) => {
                if let Err(error) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), %error, "state file write failed");
                }
            }
            Err(error) => tracing::warn!(%error, "state serialization failed"),
        }
    }
}

impl KeyValueStore for FileBackedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.flush(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.remove(key);
        self.flush(&values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_a_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        let store = FileBackedStore::open(&path).expect("open store");
        store.set("staff_role_tag", "patient_supervisor");
        drop(store);

        let reopened = FileBackedStore::open(&path).expect("reopen store");
        assert_eq!(
            reopened.get("staff_role_tag"),
            Some("patient_supervisor".to_string())
        );

        reopened.remove("staff_role_tag");
        let again = FileBackedStore::open(&path).expect("reopen after remove");
        assert_eq!(again.get("staff_role_tag"), None);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileBackedStore::open(&dir.path().join("absent.json")).expect("open store");
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn corrupt_state_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").expect("write corrupt file");
        let store = FileBackedStore::open(&path).expect("open store");
        assert_eq!(store.get("anything"), None);
    }
}
