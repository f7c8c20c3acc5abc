use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::storage::KeyValueStore;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let store = MemoryStore::new();
        store.set("survey_draft", "one").expect("set");
        store.set("survey_draft", "two").expect("set");
        assert_eq!(store.get("survey_draft").expect("get").as_deref(), Some("two"));
        assert_eq!(store.len(), 1);

        store.remove("survey_draft").expect("remove");
        assert_eq!(store.get("survey_draft").expect("get"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn removing_missing_key_is_not_an_error() {
        let store = MemoryStore::new();
        store.remove("token").expect("remove");
    }
}
