//! Birthday surprise quest.
//!
//! Five clues hide around the café. Each clue is solved by baking one of its
//! accepted recipes; once every clue is solved the surprise unlocks and the
//! reward treat lands in the inventory exactly once.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, TreatDefinition};
use super::inventory::InventoryLedger;
use crate::config::StorageKeys;
use crate::storage::{write_json, KeyValueStore};
use crate::time::Clock;

pub const QUEST_TITLE: &str = "Birthday Surprise Quest";
pub const QUEST_INTRO: &str =
    "Five whispered riddles hide in the café. Decode them to spring a birthday surprise.";
pub const UNSOLVED_LABEL: &str = "Encrypted Hint";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClueId {
    Plant,
    Frame1,
    Frame2,
    Frame3,
    Window,
}

impl ClueId {
    pub const ALL: [ClueId; 5] = [
        ClueId::Plant,
        ClueId::Frame1,
        ClueId::Frame2,
        ClueId::Frame3,
        ClueId::Window,
    ];

    /// Id used in the persisted record.
    pub fn as_str(self) -> &'static str {
        match self {
            ClueId::Plant => "plant",
            ClueId::Frame1 => "frame-1",
            ClueId::Frame2 => "frame-2",
            ClueId::Frame3 => "frame-3",
            ClueId::Window => "window",
        }
    }

    #[cfg(test)]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == id)
    }

    /// Room hotspot the clue hides in.
    pub fn location(self) -> &'static str {
        match self {
            ClueId::Plant => "the ivy plant",
            ClueId::Frame1 => "the sleepy frame",
            ClueId::Frame2 => "the golden frame",
            ClueId::Frame3 => "the secret frame",
            ClueId::Window => "the sunlit window",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            ClueId::Plant => "☘",
            ClueId::Frame1 => "✧",
            ClueId::Frame2 => "✶",
            ClueId::Frame3 => "❖",
            ClueId::Window => "ღ",
        }
    }
}

pub struct ClueRequirement {
    pub clue: ClueId,
    /// Canonical recipe keys, any of which solves the clue.
    pub accepted_keys: &'static [&'static str],
    pub hint: &'static str,
}

impl ClueRequirement {
    pub fn accepts(&self, treat_key: &str) -> bool {
        self.accepted_keys.contains(&treat_key)
    }
}

pub const CLUE_REQUIREMENTS: &[ClueRequirement] = &[
    ClueRequirement {
        clue: ClueId::Plant,
        accepted_keys: &["fish+milk", "fish+honey+milk"],
        hint: "Where shoreline brine meets sunlit nectar, a milk bottle clinks softly.",
    },
    ClueRequirement {
        clue: ClueId::Frame1,
        accepted_keys: &["butter+catnip+flour", "catnip+flour"],
        hint: "Press meadow sparkles into buttered clouds; a catnip breeze shows the way.",
    },
    ClueRequirement {
        clue: ClueId::Frame2,
        accepted_keys: &["butter+honey+milk", "butter+milk"],
        hint: "Braid the dawnlight with a silky pour and two scoops of molten gold.",
    },
    ClueRequirement {
        clue: ClueId::Frame3,
        accepted_keys: &["cream+flour+milk"],
        hint: "Fold winter snow into a silky pour, dusted with cloud-soft crumb.",
    },
    ClueRequirement {
        clue: ClueId::Window,
        accepted_keys: &["catnip+honey", "flour+honey"],
        hint: "Where the sill drinks the sun, amber drips over green sprigs or soft crumb.",
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClueState {
    Unsolved,
    /// Holds the key of the treat that solved it. Never overwritten.
    Solved(String),
}

impl ClueState {
    pub fn is_solved(&self) -> bool {
        matches!(self, ClueState::Solved(_))
    }
}

// ── Persisted records ─────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestRecord {
    #[serde(default)]
    clue_treat_keys: BTreeMap<String, Option<String>>,
    #[serde(default)]
    surprise_unlocked_at: Option<f64>,
    #[serde(default)]
    is_surprise_claimed: bool,
}

/// Shape written by the first release: progress tracked by treat name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyQuestRecord {
    #[serde(default)]
    completed_treats: BTreeMap<String, bool>,
    #[serde(default)]
    surprise_unlocked_at: Option<f64>,
    #[serde(default)]
    is_surprise_claimed: bool,
}

enum StoredQuest {
    Current(QuestRecord),
    Legacy(LegacyQuestRecord),
    Empty,
}

/// Try the current record, then the legacy one, then give up.
/// An unreadable current record is removed; the legacy record is never touched.
fn read_stored(store: &dyn KeyValueStore, keys: &StorageKeys) -> StoredQuest {
    if let Some(raw) = store.get(&keys.quest) {
        match serde_json::from_str::<QuestRecord>(&raw) {
            Ok(record) => return StoredQuest::Current(record),
            Err(e) => {
                log::warn!("quest record is unreadable ({e}); discarding it");
                store.remove(&keys.quest);
            }
        }
    }
    if let Some(raw) = store.get(&keys.legacy_quest) {
        match serde_json::from_str::<LegacyQuestRecord>(&raw) {
            Ok(record) => return StoredQuest::Legacy(record),
            Err(e) => log::warn!("legacy quest record is unreadable ({e}); ignoring it"),
        }
    }
    StoredQuest::Empty
}

// ── Engine ────────────────────────────────────────────────────

/// What a quest call changed, for the shell's toasts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestEvent {
    pub solved: Vec<ClueId>,
    pub surprise_unlocked: bool,
    pub reward_granted: bool,
}

impl QuestEvent {
    pub fn is_empty(&self) -> bool {
        self.solved.is_empty() && !self.surprise_unlocked && !self.reward_granted
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestStep {
    pub clue: ClueId,
    /// Name of the solving treat, or [`UNSOLVED_LABEL`].
    pub label: String,
    pub hint: &'static str,
    pub is_complete: bool,
    pub solved_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestStatus {
    pub title: &'static str,
    pub intro: &'static str,
    pub steps: Vec<QuestStep>,
    pub is_complete: bool,
    pub is_surprise_available: bool,
    pub is_surprise_claimed: bool,
}

pub struct QuestEngine {
    requirements: &'static [ClueRequirement],
    /// Parallel to `requirements`.
    states: Vec<ClueState>,
    surprise_unlocked_at: Option<f64>,
    is_surprise_claimed: bool,
    catalog: Rc<Catalog>,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    storage_key: String,
}

impl QuestEngine {
    /// Load progress. No completion check runs here; a fully solved record
    /// with an unclaimed reward waits for the next bake or an explicit claim.
    pub fn load(
        catalog: Rc<Catalog>,
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        keys: &StorageKeys,
        requirements: &'static [ClueRequirement],
    ) -> Self {
        let stored = read_stored(store.as_ref(), keys);
        let mut engine = Self {
            requirements,
            states: vec![ClueState::Unsolved; requirements.len()],
            surprise_unlocked_at: None,
            is_surprise_claimed: false,
            catalog,
            store,
            clock,
            storage_key: keys.quest.clone(),
        };

        match stored {
            StoredQuest::Current(record) => engine.apply_current(record),
            StoredQuest::Legacy(record) => {
                engine.apply_legacy(record);
                log::info!("migrated legacy quest progress");
                engine.persist();
            }
            StoredQuest::Empty => {}
        }
        engine
    }

    fn apply_current(&mut self, record: QuestRecord) {
        for (req, state) in self.requirements.iter().zip(self.states.iter_mut()) {
            if let Some(Some(key)) = record.clue_treat_keys.get(req.clue.as_str()) {
                let key = key.trim();
                if !key.is_empty() {
                    *state = ClueState::Solved(key.to_string());
                }
            }
        }
        self.surprise_unlocked_at = record.surprise_unlocked_at;
        self.is_surprise_claimed = record.is_surprise_claimed;
    }

    /// Treat name -> catalog key -> every clue that accepts the key.
    fn apply_legacy(&mut self, record: LegacyQuestRecord) {
        for (name, _) in record.completed_treats.iter().filter(|(_, done)| **done) {
            let Some(treat) = self.catalog.find_by_name(name) else {
                log::debug!("legacy quest names unknown treat `{name}`");
                continue;
            };
            for (req, state) in self.requirements.iter().zip(self.states.iter_mut()) {
                if *state == ClueState::Unsolved && req.accepts(&treat.key) {
                    *state = ClueState::Solved(treat.key.clone());
                }
            }
        }
        self.surprise_unlocked_at = record.surprise_unlocked_at;
        self.is_surprise_claimed = record.is_surprise_claimed;
    }

    fn to_record(&self) -> QuestRecord {
        let clue_treat_keys = self
            .requirements
            .iter()
            .zip(&self.states)
            .map(|(req, state)| {
                let key = match state {
                    ClueState::Solved(key) => Some(key.clone()),
                    ClueState::Unsolved => None,
                };
                (req.clue.as_str().to_string(), key)
            })
            .collect();
        QuestRecord {
            clue_treat_keys,
            surprise_unlocked_at: self.surprise_unlocked_at,
            is_surprise_claimed: self.is_surprise_claimed,
        }
    }

    fn persist(&self) {
        write_json(self.store.as_ref(), &self.storage_key, &self.to_record());
    }

    pub fn all_solved(&self) -> bool {
        self.states.iter().all(ClueState::is_solved)
    }

    pub fn clue_state(&self, clue: ClueId) -> Option<&ClueState> {
        self.requirements
            .iter()
            .position(|r| r.clue == clue)
            .map(|i| &self.states[i])
    }

    pub fn requirement(&self, clue: ClueId) -> Option<&'static ClueRequirement> {
        self.requirements.iter().find(|r| r.clue == clue)
    }

    #[cfg(test)]
    pub fn surprise_unlocked_at(&self) -> Option<f64> {
        self.surprise_unlocked_at
    }

    pub fn is_surprise_claimed(&self) -> bool {
        self.is_surprise_claimed
    }

    /// The one guarded path that puts the reward into the inventory.
    fn try_grant(&mut self, inventory: &mut InventoryLedger, event: &mut QuestEvent) {
        if self.surprise_unlocked_at.is_none() || self.is_surprise_claimed {
            return;
        }
        inventory.add(self.catalog.reward());
        self.is_surprise_claimed = true;
        event.reward_granted = true;
        log::info!("birthday surprise granted");
    }

    /// Solve every unsolved clue that accepts `treat`, then run the
    /// completion check. Solving the last clue grants the reward.
    pub fn register_baked(
        &mut self,
        treat: &TreatDefinition,
        inventory: &mut InventoryLedger,
    ) -> QuestEvent {
        let mut event = QuestEvent::default();
        for (req, state) in self.requirements.iter().zip(self.states.iter_mut()) {
            if *state == ClueState::Unsolved && req.accepts(&treat.key) {
                *state = ClueState::Solved(treat.key.clone());
                event.solved.push(req.clue);
            }
        }

        if self.all_solved() {
            if self.surprise_unlocked_at.is_none() {
                self.surprise_unlocked_at = Some(self.clock.now_ms());
                event.surprise_unlocked = true;
            }
            self.try_grant(inventory, &mut event);
        }

        if !event.is_empty() {
            self.persist();
        }
        event
    }

    /// Grant the reward if it is unlocked and unclaimed; otherwise a no-op.
    pub fn claim_reward(&mut self, inventory: &mut InventoryLedger) -> QuestEvent {
        let mut event = QuestEvent::default();
        self.try_grant(inventory, &mut event);
        if event.reward_granted {
            self.persist();
        }
        event
    }

    pub fn status(&self) -> QuestStatus {
        let steps = self
            .requirements
            .iter()
            .zip(&self.states)
            .map(|(req, state)| {
                let solved_key = match state {
                    ClueState::Solved(key) => Some(key.clone()),
                    ClueState::Unsolved => None,
                };
                let label = match &solved_key {
                    Some(key) => self.catalog.lookup_by_key(key).name.clone(),
                    None => UNSOLVED_LABEL.to_string(),
                };
                QuestStep {
                    clue: req.clue,
                    label,
                    hint: req.hint,
                    is_complete: solved_key.is_some(),
                    solved_key,
                }
            })
            .collect();

        QuestStatus {
            title: QUEST_TITLE,
            intro: QUEST_INTRO,
            steps,
            is_complete: self.all_solved(),
            is_surprise_available: self.surprise_unlocked_at.is_some(),
            is_surprise_claimed: self.is_surprise_claimed,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::cafe::catalog::REWARD_KEY;
    use crate::storage::MemoryStore;
    use crate::time::ManualClock;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Step {
        /// Index into bakeable treats; one past the end is the fallback.
        Bake(usize),
        Claim,
        Reload,
    }

    fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
        let treat_count = Catalog::new().all_treats().len();
        prop::collection::vec(
            prop_oneof![
                6 => (0..=treat_count).prop_map(Step::Bake),
                1 => Just(Step::Claim),
                1 => Just(Step::Reload),
            ],
            0..60,
        )
    }

    proptest! {
        #[test]
        fn prop_progress_is_monotone_and_reward_granted_once(steps in arb_steps()) {
            let catalog = Rc::new(Catalog::new());
            let store = Rc::new(MemoryStore::new());
            let clock = Rc::new(ManualClock::starting_at(0.0));
            let keys = StorageKeys::default();
            let load = || QuestEngine::load(
                catalog.clone(),
                store.clone(),
                clock.clone(),
                &keys,
                CLUE_REQUIREMENTS,
            );
            let mut quest = load();
            let mut inv = InventoryLedger::load(
                catalog.clone(),
                store.clone(),
                clock.clone(),
                &keys.inventory,
            );
            let mut seen: BTreeMap<ClueId, String> = BTreeMap::new();
            let mut grants = 0;
            let mut unlocked_at: Option<f64> = None;

            for step in steps {
                clock.advance(10.0);
                let event = match step {
                    Step::Bake(i) => {
                        let treat = catalog
                            .all_treats()
                            .get(i)
                            .unwrap_or(catalog.fallback())
                            .clone();
                        quest.register_baked(&treat, &mut inv)
                    }
                    Step::Claim => quest.claim_reward(&mut inv),
                    Step::Reload => {
                        quest = load();
                        QuestEvent::default()
                    }
                };
                if event.reward_granted {
                    grants += 1;
                }

                for (clue, key) in &seen {
                    prop_assert_eq!(
                        quest.clue_state(*clue),
                        Some(&ClueState::Solved(key.clone()))
                    );
                }
                for clue in ClueId::ALL {
                    if let Some(ClueState::Solved(key)) = quest.clue_state(clue) {
                        seen.entry(clue).or_insert_with(|| key.clone());
                    }
                }

                // once set, the unlock time never moves or clears
                match unlocked_at {
                    Some(ts) => prop_assert_eq!(quest.surprise_unlocked_at(), Some(ts)),
                    None => unlocked_at = quest.surprise_unlocked_at(),
                }

                prop_assert!(grants <= 1);
                prop_assert_eq!(inv.count_of(REWARD_KEY), grants);
                prop_assert_eq!(quest.is_surprise_claimed(), grants == 1);
                prop_assert_eq!(quest.is_surprise_claimed(), quest.all_solved());
            }
        }
    }
}
