use std::collections::HashMap;
use std::sync::RwLock;

use super::{DatabaseError, KeyValueStorage};

/// Process-local storage. Contents vanish with the process, like a fresh tab.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let items = self.items.read().map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}
