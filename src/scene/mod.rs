//! The café scene: which screen is open, what the cat is doing, and the
//! timers that pace it all.
//!
//! Input arrives as single action keys (keyboard or a tapped row). Every
//! engine call goes through the [`Cafe`] passed in; the scene itself only
//! holds presentation state.

pub mod reactions;
pub mod render;

use crate::cafe::catalog::{ingredient_label, TreatDefinition, INGREDIENTS};
use crate::cafe::quest::{ClueId, QuestEvent};
use crate::cafe::Cafe;
use crate::config::CafeConfig;
use crate::time::Countdown;

use reactions::{
    reaction_for, CatReaction, DEFAULT_REACTION, DEFAULT_TREAT_LABEL, IDLE_REACTION,
    IDLE_TREAT_LABEL, PETTING_REACTIONS,
};

const MAX_SELECTION: usize = 3;
const MIN_BAKE: usize = 2;
/// Inventory rows reachable with the digit keys.
pub const INVENTORY_SLOTS: usize = 9;
const MAX_LOG: usize = 50;

pub const KEY_BACK: char = 'q';

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Welcome,
    Room,
    Bake,
    Inventory,
    RecipeBook,
    Clue(ClueId),
    Letter,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BakePhase {
    Choosing,
    /// Waiting on the reveal timer.
    Baking(TreatDefinition),
    Result { treat: TreatDefinition, stored: bool },
}

/// An action the player can take on the current screen.
#[derive(Clone, Debug)]
pub struct Action {
    pub label: String,
    pub key: char,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

pub struct Scene {
    pub mode: Mode,
    pub actions: Vec<Action>,
    pub log: Vec<LogEntry>,
    /// Ingredient ids in pick order.
    pub selection: Vec<&'static str>,
    pub bake: BakePhase,
    pub reaction: &'static CatReaction,
    pub cat_label: String,
    pub is_speaking: bool,
    pub toast: Option<String>,
    /// Hotspots the player has inspected, in discovery order.
    pub discovered: Vec<ClueId>,
    pet_index: usize,
    bake_timer: Countdown,
    idle_timer: Countdown,
    dialogue_timer: Countdown,
    toast_timer: Countdown,
    config: CafeConfig,
}

impl Scene {
    pub fn new(cafe: &Cafe, config: &CafeConfig) -> Self {
        let mode = if cafe.has_seen_welcome() {
            Mode::Room
        } else {
            Mode::Welcome
        };
        let mut scene = Scene {
            mode,
            actions: Vec::new(),
            log: Vec::new(),
            selection: Vec::new(),
            bake: BakePhase::Choosing,
            reaction: &DEFAULT_REACTION,
            cat_label: DEFAULT_TREAT_LABEL.to_string(),
            is_speaking: false,
            toast: None,
            discovered: Vec::new(),
            pet_index: 1,
            bake_timer: Countdown::idle(),
            idle_timer: Countdown::idle(),
            dialogue_timer: Countdown::idle(),
            toast_timer: Countdown::idle(),
            config: config.clone(),
        };
        scene.idle_timer.start(scene.config.idle_timeout_ticks);
        scene.add_log("The café lights flicker on. The cat stretches by the counter.", false);
        scene.update_actions(cafe);
        scene
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.reaction == &IDLE_REACTION
    }

    // ── Cat ───────────────────────────────────────────────────

    fn say(&mut self, reaction: &'static CatReaction) {
        self.reaction = reaction;
        self.is_speaking = true;
        self.dialogue_timer.start(self.config.dialogue_ticks);
    }

    /// Show the cat's response to a treat, or to an empty paw when `None`.
    fn react_to(&mut self, treat: Option<&TreatDefinition>) {
        match treat {
            Some(treat) => {
                self.cat_label = treat.name.clone();
                self.say(reaction_for(&treat.name));
            }
            None => {
                self.cat_label = DEFAULT_TREAT_LABEL.to_string();
                self.say(&DEFAULT_REACTION);
            }
        }
        self.pet_index = 1;
    }

    fn pet(&mut self) {
        let reaction = PETTING_REACTIONS
            .get(self.pet_index)
            .unwrap_or(&DEFAULT_REACTION);
        self.pet_index = (self.pet_index + 1) % PETTING_REACTIONS.len();
        self.say(reaction);
        self.add_log(reaction.message, false);
    }

    /// Any input counts as activity: wake the cat and restart the idle timer.
    fn touch(&mut self) {
        if self.is_sleeping() {
            self.reaction = &DEFAULT_REACTION;
            self.cat_label = DEFAULT_TREAT_LABEL.to_string();
            self.add_log("The cat blinks awake.", false);
        }
        self.idle_timer.start(self.config.idle_timeout_ticks);
    }

    fn doze_off(&mut self) {
        if self.is_sleeping() {
            return;
        }
        self.reaction = &IDLE_REACTION;
        self.cat_label = IDLE_TREAT_LABEL.to_string();
        self.is_speaking = false;
        self.dialogue_timer.cancel();
        self.pet_index = 1;
    }

    // ── Quest feedback ────────────────────────────────────────

    fn announce(&mut self, event: &QuestEvent) {
        for clue in &event.solved {
            self.add_log(
                &format!("{} A clue shimmers near {}!", clue.glyph(), clue.location()),
                true,
            );
        }
        if event.surprise_unlocked {
            self.toast = Some("All riddles solved! The birthday surprise awaits.".to_string());
            self.toast_timer.start(self.config.reward_toast_ticks);
        }
        if event.reward_granted {
            self.add_log(
                "🎉 A Birthday Surprise Cake is waiting in your inventory!",
                true,
            );
        }
    }

    pub fn all_hotspots_found(&self) -> bool {
        ClueId::ALL.iter().all(|c| self.discovered.contains(c))
    }

    /// The hidden parcel shows once every hotspot has been inspected and the
    /// surprise is unlocked but still unclaimed.
    pub fn parcel_visible(&self, cafe: &Cafe) -> bool {
        let status = cafe.quest.status();
        self.all_hotspots_found() && status.is_surprise_available && !status.is_surprise_claimed
    }

    fn inspect(&mut self, clue: ClueId) {
        if !self.discovered.contains(&clue) {
            self.discovered.push(clue);
            self.add_log(
                &format!("You find a tiny note tucked into {}.", clue.location()),
                false,
            );
        }
        self.mode = Mode::Clue(clue);
    }

    // ── Baking ────────────────────────────────────────────────

    pub fn selection_preview(&self) -> String {
        if self.selection.is_empty() {
            return "No ingredients yet".to_string();
        }
        INGREDIENTS
            .iter()
            .filter(|i| self.selection.contains(&i.id))
            .map(|i| ingredient_label(i.id))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    pub fn can_bake(&self) -> bool {
        self.bake == BakePhase::Choosing
            && (MIN_BAKE..=MAX_SELECTION).contains(&self.selection.len())
    }

    fn toggle_ingredient(&mut self, id: &'static str) {
        match self.bake {
            BakePhase::Baking(_) => return,
            BakePhase::Result { .. } => self.bake = BakePhase::Choosing,
            BakePhase::Choosing => {}
        }
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else if self.selection.len() < MAX_SELECTION {
            self.selection.push(id);
        }
    }

    fn start_bake(&mut self, cafe: &Cafe) {
        if !self.can_bake() {
            return;
        }
        let treat = cafe.resolve(&self.selection);
        self.add_log(&format!("Mixing {}...", self.selection_preview()), false);
        self.bake = BakePhase::Baking(treat);
        self.bake_timer.start(self.config.bake_delay_ticks);
    }

    fn reveal_bake(&mut self, cafe: &mut Cafe) {
        let treat = match &self.bake {
            BakePhase::Baking(treat) => treat.clone(),
            _ => return,
        };
        let event = cafe.finish_bake(&treat);
        if treat.is_fallback {
            self.add_log(&format!("Oops... {}.", treat.name), false);
        } else {
            self.add_log(&format!("Fresh from the oven: {}!", treat.name), true);
        }
        self.announce(&event);
        self.bake = BakePhase::Result {
            treat,
            stored: false,
        };
    }

    fn reset_bake(&mut self) {
        self.bake_timer.cancel();
        self.bake = BakePhase::Choosing;
        self.selection.clear();
    }

    fn close_bake(&mut self) {
        if self.bake_timer.is_running() {
            self.add_log("You pull the tray out early. Nothing baked.", false);
        }
        self.reset_bake();
        self.mode = Mode::Room;
    }

    // ── Input ─────────────────────────────────────────────────

    pub fn update_actions(&mut self, cafe: &Cafe) {
        let mut actions = Vec::new();
        let mut push = |key: char, label: String| actions.push(Action { label, key });

        match &self.mode {
            Mode::Welcome => push('e', "Step inside the café".to_string()),
            Mode::Room => {
                push('b', "Baking corner".to_string());
                push('i', format!("Inventory ({})", cafe.inventory.len()));
                push('r', "Recipe book".to_string());
                push('p', "Pet the cat".to_string());
                for (i, clue) in ClueId::ALL.iter().enumerate() {
                    let key = char::from(b'1' + i as u8);
                    push(key, format!("{} Inspect {}", clue.glyph(), clue.location()));
                }
                if self.parcel_visible(cafe) {
                    push('g', "🎁 Unwrap the ribboned package".to_string());
                }
                if cafe.quest.is_surprise_claimed() {
                    push('l', "✉ Read the letter".to_string());
                }
            }
            Mode::Bake => match &self.bake {
                BakePhase::Choosing | BakePhase::Result { .. } => {
                    for (i, ingredient) in INGREDIENTS.iter().enumerate() {
                        let mark = if self.selection.contains(&ingredient.id) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        let key = char::from(b'1' + i as u8);
                        push(
                            key,
                            format!(
                                "{mark} {} {} ({})",
                                ingredient.icon, ingredient.label, ingredient.flavor_note
                            ),
                        );
                    }
                    if let BakePhase::Result { stored, .. } = &self.bake {
                        if !*stored {
                            push('s', "Store in inventory".to_string());
                        }
                        push('f', "Feed the cat now".to_string());
                        push('a', "Bake again".to_string());
                    } else if self.can_bake() {
                        push('m', "Mix & bake".to_string());
                    } else {
                        push('m', "Mix & bake (choose 2 or 3)".to_string());
                    }
                    push(KEY_BACK, "Leave the kitchen".to_string());
                }
                BakePhase::Baking(_) => push(KEY_BACK, "Stop baking".to_string()),
            },
            Mode::Inventory => {
                for (i, item) in cafe
                    .inventory
                    .newest_first()
                    .iter()
                    .take(INVENTORY_SLOTS)
                    .enumerate()
                {
                    let key = char::from(b'1' + i as u8);
                    push(key, format!("Feed {}", item.treat.name));
                }
                push(KEY_BACK, "Close".to_string());
            }
            Mode::RecipeBook | Mode::Clue(_) | Mode::Letter => {
                push(KEY_BACK, "Close".to_string())
            }
        }
        self.actions = actions;
    }

    pub fn handle_action(&mut self, cafe: &mut Cafe, key: char) {
        self.touch();

        if self.actions.iter().any(|a| a.key == key) {
            match self.mode.clone() {
                Mode::Welcome => self.handle_welcome_action(cafe, key),
                Mode::Room => self.handle_room_action(cafe, key),
                Mode::Bake => self.handle_bake_action(cafe, key),
                Mode::Inventory => self.handle_inventory_action(cafe, key),
                Mode::RecipeBook | Mode::Clue(_) | Mode::Letter => {
                    if key == KEY_BACK {
                        self.mode = Mode::Room;
                    }
                }
            }
        }

        self.update_actions(cafe);
    }

    fn handle_welcome_action(&mut self, cafe: &mut Cafe, key: char) {
        if key == 'e' {
            cafe.mark_welcome_seen();
            self.mode = Mode::Room;
        }
    }

    fn handle_room_action(&mut self, cafe: &mut Cafe, key: char) {
        match key {
            'b' => self.mode = Mode::Bake,
            'i' => self.mode = Mode::Inventory,
            'r' => self.mode = Mode::RecipeBook,
            'p' => self.pet(),
            '1'..='5' => {
                let index = (key as u8 - b'1') as usize;
                if let Some(&clue) = ClueId::ALL.get(index) {
                    self.inspect(clue);
                }
            }
            'g' => {
                let event = cafe.claim_reward();
                self.announce(&event);
            }
            'l' => self.mode = Mode::Letter,
            _ => {}
        }
    }

    fn handle_bake_action(&mut self, cafe: &mut Cafe, key: char) {
        match key {
            KEY_BACK => self.close_bake(),
            '1'..='8' => {
                let index = (key as u8 - b'1') as usize;
                if let Some(ingredient) = INGREDIENTS.get(index) {
                    self.toggle_ingredient(ingredient.id);
                }
            }
            'm' => self.start_bake(cafe),
            's' => {
                if let BakePhase::Result { treat, stored } = &mut self.bake {
                    if !*stored {
                        cafe.store_treat(treat);
                        *stored = true;
                        let line = format!("{} goes into the pantry.", treat.name);
                        self.add_log(&line, false);
                    }
                }
            }
            'f' => {
                if let BakePhase::Result { treat, .. } = &self.bake {
                    let treat = treat.clone();
                    self.react_to(Some(&treat));
                    self.add_log(&format!("You feed the cat {}.", treat.name), false);
                    self.close_bake();
                }
            }
            'a' => self.reset_bake(),
            _ => {}
        }
    }

    fn handle_inventory_action(&mut self, cafe: &mut Cafe, key: char) {
        match key {
            KEY_BACK => self.mode = Mode::Room,
            '1'..='9' => {
                let index = (key as u8 - b'1') as usize;
                let entry_id = cafe
                    .inventory
                    .newest_first()
                    .get(index)
                    .map(|item| item.entry.id.clone());
                if let Some(entry_id) = entry_id {
                    let treat = cafe.feed(&entry_id);
                    self.react_to(treat.as_ref());
                    match treat {
                        Some(treat) => {
                            self.add_log(&format!("The cat munches {}.", treat.name), false)
                        }
                        None => self.add_log("That treat has vanished.", false),
                    }
                }
            }
            _ => {}
        }
    }

    // ── Time ──────────────────────────────────────────────────

    /// Advance every presentation timer. The bake reveal is the only one that
    /// calls into the engine.
    pub fn tick(&mut self, cafe: &mut Cafe, delta_ticks: u32) {
        if delta_ticks == 0 {
            return;
        }
        if self.bake_timer.tick(delta_ticks) {
            self.reveal_bake(cafe);
            self.update_actions(cafe);
        }
        if self.dialogue_timer.tick(delta_ticks) {
            self.is_speaking = false;
        }
        if self.toast_timer.tick(delta_ticks) {
            self.toast = None;
        }
        if self.idle_timer.tick(delta_ticks) {
            self.doze_off();
        }
    }
}
