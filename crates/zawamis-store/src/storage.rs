//! The storage port every ledger and thread is built on.
//!
//! A [`Storage`] is a flat map of named slots to string values, the same
//! shape as browser local storage. Backends: [`MemoryStorage`] here and
//! [`crate::database::SqliteStorage`] for persistence across processes.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StoreError};

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the whole value of `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process backend. Values live as long as the struct.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::LockPoisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::LockPoisoned)?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "[1]").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("[1]"));

        storage.set("k", "[2]").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("[2]"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
