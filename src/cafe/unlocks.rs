//! Recipe unlock ledger: catalog keys the player has baked at least once.
//! Only the recipe book reads it; inventory contents do not matter here.

use std::rc::Rc;

use serde_json::Value;

use crate::storage::{write_json, KeyValueStore};

fn parse_keys(raw: &str) -> Vec<String> {
    let values = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            log::warn!("unlock record is not a list; starting empty");
            return Vec::new();
        }
        Err(e) => {
            log::warn!("unlock record is unreadable ({e}); starting empty");
            return Vec::new();
        }
    };

    let mut keys: Vec<String> = Vec::with_capacity(values.len());
    for key in values.iter().filter_map(Value::as_str).map(str::trim) {
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

pub struct RecipeUnlockLedger {
    /// Unique keys in unlock order.
    keys: Vec<String>,
    store: Rc<dyn KeyValueStore>,
    storage_key: String,
}

impl RecipeUnlockLedger {
    pub fn load(store: Rc<dyn KeyValueStore>, storage_key: &str) -> Self {
        let keys = store
            .get(storage_key)
            .map(|raw| parse_keys(&raw))
            .unwrap_or_default();
        log::debug!("{} recipes unlocked", keys.len());
        Self {
            keys,
            store,
            storage_key: storage_key.to_string(),
        }
    }

    /// Add `key` if absent. Already-present keys cause no write.
    pub fn unlock(&mut self, key: &str) {
        self.unlock_many(std::iter::once(key));
    }

    /// Union `keys` into the set with a single write.
    pub fn unlock_many<'k, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut next = self.keys.clone();
        for key in keys.into_iter().map(str::trim) {
            if !key.is_empty() && !next.iter().any(|k| k == key) {
                next.push(key.to_string());
            }
        }
        if next.len() == self.keys.len() {
            return;
        }
        self.keys = next;
        write_json(self.store.as_ref(), &self.storage_key, &self.keys);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn list(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const KEY: &str = "unlocks";

    fn ledger(store: &Rc<MemoryStore>) -> RecipeUnlockLedger {
        RecipeUnlockLedger::load(store.clone(), KEY)
    }

    #[test]
    fn unlock_twice_keeps_one_copy() {
        let store = Rc::new(MemoryStore::new());
        let mut unlocks = ledger(&store);
        unlocks.unlock("fish+milk");
        unlocks.unlock("fish+milk");
        assert_eq!(unlocks.list(), ["fish+milk".to_string()]);
        assert!(unlocks.contains("fish+milk"));
        assert!(!unlocks.contains("flour+honey"));
    }

    #[test]
    fn repeat_unlock_does_not_rewrite() {
        let store = Rc::new(MemoryStore::new());
        let mut unlocks = ledger(&store);
        unlocks.unlock("fish+milk");
        store.remove(KEY);
        unlocks.unlock("fish+milk");
        assert_eq!(store.get(KEY), None);
    }

    #[test]
    fn unlock_many_is_a_union() {
        let store = Rc::new(MemoryStore::new());
        let mut unlocks = ledger(&store);
        unlocks.unlock("flour+honey");
        unlocks.unlock_many(["fish+milk", "flour+honey", "", "butter+catnip"]);
        assert_eq!(unlocks.list(), ["flour+honey", "fish+milk", "butter+catnip"]);
        assert_eq!(
            store.get(KEY).as_deref(),
            Some(r#"["flour+honey","fish+milk","butter+catnip"]"#)
        );
    }

    #[test]
    fn empty_key_is_ignored() {
        let store = Rc::new(MemoryStore::new());
        let mut unlocks = ledger(&store);
        unlocks.unlock("   ");
        assert!(unlocks.list().is_empty());
        assert_eq!(store.get(KEY), None);
    }

    #[test]
    fn load_sanitises_record() {
        let store = Rc::new(
            MemoryStore::new().with(KEY, r#"[" fish+milk ", 3, "", "fish+milk", "flour+honey"]"#),
        );
        assert_eq!(ledger(&store).list(), ["fish+milk", "flour+honey"]);
    }

    #[test]
    fn malformed_record_starts_empty() {
        for raw in [r#"{"fish+milk":true}"#, "not json", "null"] {
            let store = Rc::new(MemoryStore::new().with(KEY, raw));
            assert!(ledger(&store).list().is_empty(), "{raw}");
        }
    }

    #[test]
    fn survives_reload() {
        let store = Rc::new(MemoryStore::new());
        ledger(&store).unlock_many(["fish+milk", "flour+honey"]);
        let reloaded = ledger(&store);
        assert!(reloaded.contains("fish+milk"));
        assert!(reloaded.contains("flour+honey"));
    }

    #[test]
    fn rejected_write_keeps_memory_state() {
        let store = Rc::new(MemoryStore::read_only());
        let mut unlocks = ledger(&store);
        unlocks.unlock("fish+milk");
        assert!(unlocks.contains("fish+milk"));
    }
}
