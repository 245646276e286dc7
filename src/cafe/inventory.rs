//! Inventory ledger: the treats the player has stored and not yet fed.
//!
//! Every mutation builds a fresh entry list, swaps it in, and writes the whole
//! list to storage.

use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{Catalog, TreatDefinition};
use crate::storage::{write_json, KeyValueStore};
use crate::time::Clock;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: String,
    /// Weak reference into the catalog; display data always comes from there.
    pub treat_key: String,
    pub acquired_at: f64,
}

/// An entry with its treat resolved. Stale keys resolve to the fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryItem<'a> {
    pub entry: &'a InventoryEntry,
    pub treat: &'a TreatDefinition,
}

// ── Entry ids ─────────────────────────────────────────────────

fn next_rng(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Parse a stored entry list. Entries without a string `treatKey` are dropped;
/// a missing timestamp defaults to `now_ms` and a missing id is left empty for
/// the ledger to assign.
fn parse_entries(raw: &str, now_ms: f64) -> Option<Vec<InventoryEntry>> {
    let values: Vec<Value> = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            log::warn!("inventory record is not a list; starting empty");
            return None;
        }
        Err(e) => {
            log::warn!("inventory record is unreadable ({e}); starting empty");
            return None;
        }
    };

    let entries = values
        .iter()
        .filter_map(|value| {
            let treat_key = value.get("treatKey")?.as_str()?.to_string();
            let id = value
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default();
            let acquired_at = value
                .get("acquiredAt")
                .and_then(Value::as_f64)
                .unwrap_or(now_ms);
            Some(InventoryEntry {
                id,
                treat_key,
                acquired_at,
            })
        })
        .collect();
    Some(entries)
}

pub struct InventoryLedger {
    entries: Vec<InventoryEntry>,
    catalog: Rc<Catalog>,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    storage_key: String,
    rng_state: u64,
}

impl InventoryLedger {
    /// Load from `storage_key`. A missing or malformed record yields an empty ledger.
    pub fn load(
        catalog: Rc<Catalog>,
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        storage_key: &str,
    ) -> Self {
        let now = clock.now_ms();
        let entries = store
            .get(storage_key)
            .and_then(|raw| parse_entries(&raw, now))
            .unwrap_or_default();
        log::debug!("inventory loaded with {} entries", entries.len());
        let mut ledger = Self {
            entries: Vec::new(),
            catalog,
            store,
            clock,
            storage_key: storage_key.to_string(),
            rng_state: now.to_bits(),
        };
        ledger.adopt(entries);
        ledger
    }

    /// Take over loaded entries, giving a fresh id to every entry whose id is
    /// missing or already used by an earlier entry. Repairs are written back.
    fn adopt(&mut self, entries: Vec<InventoryEntry>) {
        let mut seen = HashSet::new();
        let needs_id: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.id.is_empty() || !seen.insert(e.id.clone()))
            .map(|(i, _)| i)
            .collect();
        self.entries = entries;
        if needs_id.is_empty() {
            return;
        }
        for &i in &needs_id {
            let id = self.fresh_id(self.entries[i].acquired_at);
            self.entries[i].id = id;
        }
        log::warn!("inventory had {} missing or duplicate ids; reassigned", needs_id.len());
        write_json(self.store.as_ref(), &self.storage_key, &self.entries);
    }

    fn replace_entries(&mut self, next: Vec<InventoryEntry>) {
        self.entries = next;
        write_json(self.store.as_ref(), &self.storage_key, &self.entries);
    }

    fn fresh_id(&mut self, now_ms: f64) -> String {
        loop {
            self.rng_state = next_rng(self.rng_state);
            let id = format!("treat-{}-{:08x}", now_ms as u64, self.rng_state >> 32);
            if !self.entries.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    /// Store a treat and return the new entry's id.
    pub fn add(&mut self, treat: &TreatDefinition) -> String {
        let now = self.clock.now_ms();
        let id = self.fresh_id(now);
        let mut next = self.entries.clone();
        next.push(InventoryEntry {
            id: id.clone(),
            treat_key: treat.key.clone(),
            acquired_at: now,
        });
        self.replace_entries(next);
        id
    }

    /// Drop an entry. Unknown ids are ignored.
    pub fn remove(&mut self, entry_id: &str) {
        if !self.entries.iter().any(|e| e.id == entry_id) {
            return;
        }
        let next = self
            .entries
            .iter()
            .filter(|e| e.id != entry_id)
            .cloned()
            .collect();
        self.replace_entries(next);
    }

    /// Take an entry out of the inventory and return its treat, in one step.
    /// This is how a treat gets fed to the cat.
    pub fn consume(&mut self, entry_id: &str) -> Option<TreatDefinition> {
        let position = self.entries.iter().position(|e| e.id == entry_id)?;
        let mut next = self.entries.clone();
        let taken = next.remove(position);
        self.replace_entries(next);
        Some(self.catalog.lookup_by_key(&taken.treat_key).clone())
    }

    /// Entries in acquisition order.
    pub fn list(&self) -> Vec<InventoryItem<'_>> {
        self.entries
            .iter()
            .map(|entry| InventoryItem {
                entry,
                treat: self.catalog.lookup_by_key(&entry.treat_key),
            })
            .collect()
    }

    /// Entries newest first, the order the inventory screen shows. Entries
    /// with equal timestamps come out latest-added first.
    pub fn newest_first(&self) -> Vec<InventoryItem<'_>> {
        let mut items = self.list();
        items.reverse();
        items.sort_by(|a, b| b.entry.acquired_at.total_cmp(&a.entry.acquired_at));
        items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn count_of(&self, treat_key: &str) -> usize {
        self.entries.iter().filter(|e| e.treat_key == treat_key).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::catalog::{FALLBACK_KEY, REWARD_KEY};
    use crate::storage::MemoryStore;
    use crate::time::ManualClock;

    const KEY: &str = "inventory";

    struct Fixture {
        catalog: Rc<Catalog>,
        store: Rc<MemoryStore>,
        clock: Rc<ManualClock>,
    }

    impl Fixture {
        fn new(store: MemoryStore) -> Self {
            Self {
                catalog: Rc::new(Catalog::new()),
                store: Rc::new(store),
                clock: Rc::new(ManualClock::starting_at(1_000.0)),
            }
        }

        fn ledger(&self) -> InventoryLedger {
            InventoryLedger::load(
                self.catalog.clone(),
                self.store.clone(),
                self.clock.clone(),
                KEY,
            )
        }

        fn treat(&self, key: &str) -> TreatDefinition {
            self.catalog.lookup_by_key(key).clone()
        }
    }

    #[test]
    fn add_then_list_then_consume() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        let tart = fx.treat("fish+milk");

        let id = inv.add(&tart);
        let items = inv.list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entry.id, id);
        assert_eq!(items[0].treat, &tart);

        assert_eq!(inv.consume(&id), Some(tart));
        assert!(inv.is_empty());
        assert_eq!(inv.consume(&id), None);
    }

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        let tart = fx.treat("fish+milk");
        let ids: Vec<String> = (0..50).map(|_| inv.add(&tart)).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        inv.add(&fx.treat("flour+honey"));
        inv.remove("nope");
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn remove_drops_only_that_entry() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        let a = inv.add(&fx.treat("flour+honey"));
        let b = inv.add(&fx.treat("flour+honey"));
        inv.remove(&a);
        let ids: Vec<&str> = inv.list().iter().map(|i| i.entry.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str()]);
    }

    #[test]
    fn newest_first_sorts_by_acquired_at() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        inv.add(&fx.treat("flour+honey"));
        fx.clock.advance(10.0);
        inv.add(&fx.treat("fish+milk"));
        let names: Vec<&str> = inv.newest_first().iter().map(|i| i.treat.name.as_str()).collect();
        assert_eq!(names, vec!["Milky Tuna Tart", "Honey Loaf"]);
    }

    #[test]
    fn newest_first_breaks_ties_by_insertion() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        inv.add(&fx.treat("flour+honey"));
        inv.add(&fx.treat("fish+milk"));
        assert_eq!(inv.newest_first()[0].treat.name, "Milky Tuna Tart");
    }

    #[test]
    fn mutations_persist_and_reload() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        let id = inv.add(&fx.treat(REWARD_KEY));
        let reloaded = fx.ledger();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.list()[0].entry.id, id);
        assert_eq!(reloaded.list()[0].treat.name, "Birthday Surprise Cake");
    }

    #[test]
    fn stored_shape_uses_camel_case() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        inv.add(&fx.treat("fish+milk"));
        let raw = fx.store.get(KEY).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["treatKey"], "fish+milk");
        assert_eq!(parsed[0]["acquiredAt"], 1_000.0);
        assert!(parsed[0]["id"].is_string());
    }

    #[test]
    fn load_sanitises_entries() {
        let raw = r#"[
            {"id": "a", "treatKey": "fish+milk", "acquiredAt": 5},
            {"treatKey": "flour+honey"},
            {"id": "c", "acquiredAt": 7},
            {"id": "d", "treatKey": 42},
            "junk",
            {"id": 9, "treatKey": "butter+catnip", "acquiredAt": "soon"}
        ]"#;
        let fx = Fixture::new(MemoryStore::new().with(KEY, raw));
        let inv = fx.ledger();
        let items = inv.list();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].entry.id, "a");
        assert_eq!(items[0].entry.acquired_at, 5.0);
        assert!(items[1].entry.id.starts_with("treat-1000-"));
        assert_eq!(items[1].entry.acquired_at, 1_000.0);
        assert!(items[2].entry.id.starts_with("treat-1000-"));
        assert_ne!(items[1].entry.id, items[2].entry.id);
        assert_eq!(items[2].treat.name, "Butternip Cookie");
    }

    #[test]
    fn load_reassigns_missing_and_duplicate_ids() {
        let raw = r#"[
            {"id": "treat-1000-1", "treatKey": "fish+milk", "acquiredAt": 5},
            {"treatKey": "flour+honey"},
            {"id": "treat-1000-1", "treatKey": "butter+catnip", "acquiredAt": 6}
        ]"#;
        let fx = Fixture::new(MemoryStore::new().with(KEY, raw));
        let mut inv = fx.ledger();
        let ids: Vec<String> = inv.list().iter().map(|i| i.entry.id.clone()).collect();
        assert_eq!(ids[0], "treat-1000-1");
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 3);

        inv.remove("treat-1000-1");
        assert_eq!(inv.len(), 2);

        // repaired ids survive a reload
        let reloaded = fx.ledger();
        let reloaded_ids: Vec<String> =
            reloaded.list().iter().map(|i| i.entry.id.clone()).collect();
        assert_eq!(reloaded_ids, ids[1..].to_vec());
    }

    #[test]
    fn clean_record_is_not_rewritten() {
        let raw = r#"[{"id": "a", "treatKey": "fish+milk", "acquiredAt": 5}]"#;
        let fx = Fixture::new(MemoryStore::new().with(KEY, raw));
        fx.ledger();
        assert_eq!(fx.store.get(KEY).as_deref(), Some(raw));
    }

    #[test]
    fn malformed_record_starts_empty() {
        for raw in ["{not json", r#"{"treatKey": "fish+milk"}"#, "null"] {
            let fx = Fixture::new(MemoryStore::new().with(KEY, raw));
            assert!(fx.ledger().is_empty(), "{raw}");
        }
    }

    #[test]
    fn stale_key_shows_fallback_but_stays_consumable() {
        let raw = r#"[{"id": "old", "treatKey": "retired+recipe", "acquiredAt": 1}]"#;
        let fx = Fixture::new(MemoryStore::new().with(KEY, raw));
        let mut inv = fx.ledger();
        assert_eq!(inv.list()[0].treat.key, FALLBACK_KEY);
        assert_eq!(inv.list()[0].entry.treat_key, "retired+recipe");
        let fed = inv.consume("old").unwrap();
        assert!(fed.is_fallback);
        assert!(inv.is_empty());
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let fx = Fixture::new(MemoryStore::read_only());
        let mut inv = fx.ledger();
        inv.add(&fx.treat("fish+milk"));
        assert_eq!(inv.len(), 1);
        assert!(fx.store.get(KEY).is_none());
    }

    #[test]
    fn count_of_matches_key() {
        let fx = Fixture::new(MemoryStore::new());
        let mut inv = fx.ledger();
        inv.add(&fx.treat(REWARD_KEY));
        inv.add(&fx.treat("fish+milk"));
        assert_eq!(inv.count_of(REWARD_KEY), 1);
        assert_eq!(inv.count_of("butter+catnip"), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::cafe::catalog::RECIPE_TABLE;
    use crate::storage::MemoryStore;
    use crate::time::ManualClock;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Add(usize),
        Remove(usize),
        Consume(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..RECIPE_TABLE.len()).prop_map(Op::Add),
            (0usize..8).prop_map(Op::Remove),
            (0usize..8).prop_map(Op::Consume),
        ]
    }

    proptest! {
        #[test]
        fn prop_reload_matches_memory(ops in prop::collection::vec(arb_op(), 0..30)) {
            let catalog = Rc::new(Catalog::new());
            let store = Rc::new(MemoryStore::new());
            let clock = Rc::new(ManualClock::starting_at(0.0));
            let mut inv = InventoryLedger::load(catalog.clone(), store.clone(), clock.clone(), "inv");
            let mut ids: Vec<String> = Vec::new();

            for op in ops {
                clock.advance(1.0);
                match op {
                    Op::Add(i) => {
                        let treat = catalog.all_treats()[i].clone();
                        ids.push(inv.add(&treat));
                    }
                    Op::Remove(i) => {
                        if let Some(id) = ids.get(i) {
                            inv.remove(id);
                        }
                    }
                    Op::Consume(i) => {
                        if let Some(id) = ids.get(i) {
                            let before = inv.len();
                            let fed = inv.consume(id);
                            prop_assert_eq!(fed.is_some(), inv.len() + 1 == before);
                        }
                    }
                }
            }

            let reloaded = InventoryLedger::load(catalog, store, clock, "inv");
            let a: Vec<&InventoryEntry> = inv.list().iter().map(|i| i.entry).collect();
            let b: Vec<&InventoryEntry> = reloaded.list().iter().map(|i| i.entry).collect();
            prop_assert_eq!(a, b);
        }
    }
}
