//! Read/modify/write over a single slot holding a JSON array of records.
//!
//! Reads never fail: a missing slot, text that is not JSON, or JSON that is
//! not an array all read as an empty sequence, and typed reads skip elements
//! that do not decode. `write`/`write_as` replace the whole slot;
//! `append_as` and `update_as` keep elements they cannot decode, so records
//! written by other clients survive our edits.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use zawamis_shared::RecordId;

use crate::error::Result;
use crate::storage::Storage;

/// Untyped ledger entry.
pub type Record = serde_json::Map<String, Value>;

enum Slot {
    Typed,
    Foreign(Value),
}

#[derive(Clone)]
pub struct KeyedRecordStore {
    storage: Arc<dyn Storage>,
}

impl KeyedRecordStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn read(&self, key: &str) -> Vec<Record> {
        self.read_values(key)
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }

    pub fn write(&self, key: &str, records: &[Record]) -> Result<()> {
        let text = serde_json::to_string(records)?;
        self.storage.set(key, &text)
    }

    pub fn read_as<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let values = self.read_values(key);
        let total = values.len();

        let items: Vec<T> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();

        if items.len() != total {
            tracing::warn!(
                slot = key,
                skipped = total - items.len(),
                "skipping records that do not match the expected shape"
            );
        }
        items
    }

    pub fn write_as<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.storage.set(key, &text)
    }

    /// Append one item, leaving every existing element as it was.
    pub fn append_as<T: Serialize>(&self, key: &str, item: &T) -> Result<()> {
        let mut values = self.read_values(key);
        values.push(serde_json::to_value(item)?);
        self.storage.set(key, &serde_json::to_string(&values)?)
    }

    /// Largest numeric `id` among the slot's elements, decodable or not.
    pub fn max_id(&self, key: &str) -> Option<RecordId> {
        self.read_values(key)
            .iter()
            .filter_map(|value| value.get("id")?.as_u64())
            .max()
            .map(RecordId)
    }

    /// Read the slot, let `mutate` edit it, and write it back if `mutate`
    /// returns `true`. Returns whether a write happened.
    ///
    /// `mutate` sees only the elements that decode as `T`. The others are
    /// written back untouched at their original positions; items pushed by
    /// `mutate` go at the end.
    pub fn update_as<T, F>(&self, key: &str, mutate: F) -> Result<bool>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        let values = self.read_values(key);
        let mut layout = Vec::with_capacity(values.len());
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(item) => {
                    items.push(item);
                    layout.push(Slot::Typed);
                }
                Err(_) => layout.push(Slot::Foreign(value)),
            }
        }

        if !mutate(&mut items) {
            return Ok(false);
        }

        let mut edited = items.iter();
        let mut merged = Vec::with_capacity(layout.len());
        for slot in layout {
            match slot {
                Slot::Typed => {
                    if let Some(item) = edited.next() {
                        merged.push(serde_json::to_value(item)?);
                    }
                }
                Slot::Foreign(value) => merged.push(value),
            }
        }
        for item in edited {
            merged.push(serde_json::to_value(item)?);
        }

        self.storage.set(key, &serde_json::to_string(&merged)?)?;
        Ok(true)
    }

    fn read_values(&self, key: &str) -> Vec<Value> {
        let text = match self.storage.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "slot read failed, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                tracing::warn!(slot = key, "slot does not hold an array, treating as empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(slot = key, error = %e, "slot is not valid JSON, treating as empty");
                Vec::new()
            }
        }
    }
}
