//! Key-value persistence used by every ledger.
//!
//! The browser build writes to `window.localStorage`; tests and native builds
//! use [`MemoryStore`]. All writes are fire-and-forget: callers log a failed
//! write and carry on with their in-memory state.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("persistent storage is unavailable")]
    Unavailable,
    #[error("write to `{key}` was rejected: {reason}")]
    Rejected { key: String, reason: String },
}

/// Minimal string store. Methods take `&self` so one store can be shared by
/// several ledgers through an `Rc`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str);
}

/// Serialize `value` as JSON and write it, logging instead of failing.
pub fn write_json<T: serde::Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            log::warn!("failed to serialize `{key}`: {e}");
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        log::warn!("{e}");
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, for exercising the ignore-on-failure path.
    #[cfg(test)]
    pub fn read_only() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            read_only: true,
        }
    }

    /// Seed a raw value, bypassing the read-only flag.
    #[cfg(test)]
    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "read-only store".to_string(),
            });
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Rejected {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::warn!("could not remove {key}: {e:?}");
        }
    }
}

/// First-visit marker: presence of the key means the welcome screen was seen.
pub struct WelcomeFlag {
    key: String,
}

impl WelcomeFlag {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    pub fn has_seen(&self, store: &dyn KeyValueStore) -> bool {
        store.get(&self.key).is_some()
    }

    pub fn mark_seen(&self, store: &dyn KeyValueStore) {
        if let Err(e) = store.set(&self.key, "1") {
            log::warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = MemoryStore::read_only();
        let err = store.set("k", "v").unwrap_err();
        assert!(matches!(err, StoreError::Rejected { ref key, .. } if key == "k"));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn write_json_ignores_rejected_write() {
        let store = MemoryStore::read_only();
        write_json(&store, "k", &vec!["a", "b"]);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn write_json_stores_compact_json() {
        let store = MemoryStore::new();
        write_json(&store, "k", &vec!["a", "b"]);
        assert_eq!(store.get("k").as_deref(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn welcome_flag_presence_means_seen() {
        let store = MemoryStore::new();
        let flag = WelcomeFlag::new("welcome");
        assert!(!flag.has_seen(&store));
        flag.mark_seen(&store);
        assert!(flag.has_seen(&store));
    }

    #[test]
    fn welcome_flag_accepts_any_marker_value() {
        let store = MemoryStore::new().with("welcome", "yes please");
        assert!(WelcomeFlag::new("welcome").has_seen(&store));
    }
}
