//! Café rules engine: catalog, resolver, ledgers and the quest.
//!
//! Everything here is synchronous and timer-free. The shell owns the timers
//! and calls in at trigger points.

pub mod catalog;
pub mod inventory;
pub mod quest;
pub mod resolver;
pub mod unlocks;

use std::rc::Rc;

use crate::config::CafeConfig;
use crate::storage::{KeyValueStore, WelcomeFlag};
use crate::time::Clock;
use catalog::{Catalog, TreatDefinition};
use inventory::InventoryLedger;
use quest::{QuestEngine, QuestEvent, CLUE_REQUIREMENTS};
use unlocks::RecipeUnlockLedger;

/// Service objects built once at startup and handed to the shell.
pub struct Cafe {
    pub catalog: Rc<Catalog>,
    pub inventory: InventoryLedger,
    pub unlocks: RecipeUnlockLedger,
    pub quest: QuestEngine,
    welcome: WelcomeFlag,
    store: Rc<dyn KeyValueStore>,
}

impl Cafe {
    pub fn open(config: &CafeConfig, store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let keys = &config.keys;
        let catalog = Rc::new(Catalog::new());
        let inventory =
            InventoryLedger::load(catalog.clone(), store.clone(), clock.clone(), &keys.inventory);
        let unlocks = RecipeUnlockLedger::load(store.clone(), &keys.unlocks);
        let quest = QuestEngine::load(
            catalog.clone(),
            store.clone(),
            clock,
            keys,
            CLUE_REQUIREMENTS,
        );
        Self {
            catalog,
            inventory,
            unlocks,
            quest,
            welcome: WelcomeFlag::new(&keys.welcome),
            store,
        }
    }

    pub fn resolve<S: AsRef<str>>(&self, ingredient_ids: &[S]) -> TreatDefinition {
        resolver::resolve(&self.catalog, ingredient_ids).clone()
    }

    /// A bake result was revealed: feed it to the quest, and add it to the
    /// recipe book unless it is the fallback.
    pub fn finish_bake(&mut self, treat: &TreatDefinition) -> QuestEvent {
        let event = self.quest.register_baked(treat, &mut self.inventory);
        if !treat.is_fallback {
            self.unlocks.unlock(&treat.key);
        }
        event
    }

    pub fn store_treat(&mut self, treat: &TreatDefinition) -> String {
        self.inventory.add(treat)
    }

    /// Feed a stored treat to the cat.
    pub fn feed(&mut self, entry_id: &str) -> Option<TreatDefinition> {
        self.inventory.consume(entry_id)
    }

    pub fn claim_reward(&mut self) -> QuestEvent {
        self.quest.claim_reward(&mut self.inventory)
    }

    pub fn has_seen_welcome(&self) -> bool {
        self.welcome.has_seen(self.store.as_ref())
    }

    pub fn mark_welcome_seen(&self) {
        self.welcome.mark_seen(self.store.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cafe::catalog::REWARD_KEY;
    use crate::cafe::quest::ClueId;
    use crate::storage::MemoryStore;
    use crate::time::ManualClock;

    fn open(store: &Rc<MemoryStore>) -> Cafe {
        Cafe::open(
            &CafeConfig::default(),
            store.clone(),
            Rc::new(ManualClock::starting_at(1_000.0)),
        )
    }

    #[test]
    fn bake_unlocks_recipe_and_solves_clue() {
        let store = Rc::new(MemoryStore::new());
        let mut cafe = open(&store);
        let tart = cafe.resolve(&["milk", "fish"]);
        let event = cafe.finish_bake(&tart);
        assert_eq!(event.solved, vec![ClueId::Plant]);
        assert!(cafe.unlocks.contains("fish+milk"));
        // baking alone does not store the treat
        assert!(cafe.inventory.is_empty());
    }

    #[test]
    fn fallback_is_never_unlocked() {
        let store = Rc::new(MemoryStore::new());
        let mut cafe = open(&store);
        let goo = cafe.resolve(&["berries", "cream"]);
        assert!(goo.is_fallback);
        assert!(cafe.finish_bake(&goo).is_empty());
        assert!(cafe.unlocks.list().is_empty());
    }

    #[test]
    fn store_then_feed() {
        let store = Rc::new(MemoryStore::new());
        let mut cafe = open(&store);
        let loaf = cafe.resolve(&["honey", "flour"]);
        let id = cafe.store_treat(&loaf);
        assert_eq!(cafe.feed(&id), Some(loaf));
        assert_eq!(cafe.feed(&id), None);
    }

    #[test]
    fn full_quest_survives_restart() {
        let store = Rc::new(MemoryStore::new());
        {
            let mut cafe = open(&store);
            for combo in [
                ["fish", "milk"],
                ["catnip", "flour"],
                ["butter", "milk"],
                ["honey", "flour"],
            ] {
                let treat = cafe.resolve(&combo);
                cafe.finish_bake(&treat);
            }
            let puff = cafe.resolve(&["milk", "flour", "cream"]);
            assert!(cafe.finish_bake(&puff).reward_granted);
        }
        let mut cafe = open(&store);
        assert_eq!(cafe.inventory.count_of(REWARD_KEY), 1);
        assert_eq!(cafe.unlocks.list().len(), 5);
        assert!(cafe.quest.status().is_surprise_claimed);
        assert!(cafe.claim_reward().is_empty());
    }

    #[test]
    fn welcome_flag_round_trip() {
        let store = Rc::new(MemoryStore::new());
        let cafe = open(&store);
        assert!(!cafe.has_seen_welcome());
        cafe.mark_welcome_seen();
        assert!(open(&store).has_seen_welcome());
    }
}
