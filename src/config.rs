//! Storage keys and presentation pacing.
//!
//! Tick values assume [`TICKS_PER_SEC`] ticks per second.

pub const TICKS_PER_SEC: u32 = 10;

#[derive(Clone, Debug)]
pub struct StorageKeys {
    pub inventory: String,
    pub unlocks: String,
    pub quest: String,
    /// Read-only; migrated into `quest` on first load.
    pub legacy_quest: String,
    pub welcome: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            inventory: "virtual-cat-cafe.inventory.v1".to_string(),
            unlocks: "virtual-cat-cafe.recipes.v1".to_string(),
            quest: "virtual-cat-cafe.quest.birthday.v2".to_string(),
            legacy_quest: "virtual-cat-cafe.quest.birthday.v1".to_string(),
            welcome: "cat-cafe-entry-welcome".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CafeConfig {
    pub keys: StorageKeys,
    /// Delay before a bake result is revealed. 1.5s.
    pub bake_delay_ticks: u32,
    /// Inactivity before the cat dozes off. 60s.
    pub idle_timeout_ticks: u32,
    /// How long a cat speech bubble stays up. 4s.
    pub dialogue_ticks: u32,
    /// How long the reward toast stays up. 5s.
    pub reward_toast_ticks: u32,
}

impl Default for CafeConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            bake_delay_ticks: 15,
            idle_timeout_ticks: 60 * TICKS_PER_SEC,
            dialogue_ticks: 4 * TICKS_PER_SEC,
            reward_toast_ticks: 5 * TICKS_PER_SEC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quest_keys_differ_between_versions() {
        let keys = StorageKeys::default();
        assert_ne!(keys.quest, keys.legacy_quest);
    }

    #[test]
    fn pacing_defaults() {
        let config = CafeConfig::default();
        assert_eq!(config.bake_delay_ticks, 15);
        assert_eq!(config.idle_timeout_ticks, 600);
        assert_eq!(config.dialogue_ticks, 40);
        assert_eq!(config.reward_toast_ticks, 50);
    }
}
