//! How the café cat responds to treats, pets and neglect.

#[derive(Debug, PartialEq, Eq)]
pub struct CatReaction {
    pub mood: &'static str,
    pub message: &'static str,
}

pub const DEFAULT_REACTION: CatReaction = CatReaction {
    mood: "curious",
    message: "The cat tilts its head curiously.",
};

pub const IDLE_REACTION: CatReaction = CatReaction {
    mood: "sleepy",
    message: "The cat curls into a drowsy loaf.",
};

pub const DEFAULT_TREAT_LABEL: &str = "Awaiting treat";
pub const IDLE_TREAT_LABEL: &str = "Dozing off";

/// Keyed by treat display name.
const TREAT_REACTIONS: &[(&str, CatReaction)] = &[
    (
        "Milky Tuna Tart",
        CatReaction { mood: "happy", message: "Purrfect combo!" },
    ),
    (
        "Honey Loaf",
        CatReaction { mood: "sleepy", message: "Sugar dreams~" },
    ),
    (
        "Butternip Cookie",
        CatReaction { mood: "playful", message: "Catnip twirls ignite zoomies!" },
    ),
    (
        "Honeyed Fish Bites",
        CatReaction {
            mood: "happy",
            message: "Sweet glaze plus fish flakes? Jubilant whisker wiggles!",
        },
    ),
    (
        "Fluffy Catnip Scones",
        CatReaction {
            mood: "playful",
            message: "The cat stacks scones like towers before pouncing them apart.",
        },
    ),
    (
        "Sweet Milkbread Twist",
        CatReaction {
            mood: "sleepy",
            message: "Warm carb lullaby achieved. Nap countdown engaged.",
        },
    ),
    (
        "Birthday Surprise Cake",
        CatReaction {
            mood: "happy",
            message: "Confetti sneezes! It's party time in the café.",
        },
    ),
];

/// Petting walks this list; index 0 is only reached after a full lap.
pub const PETTING_REACTIONS: &[CatReaction] = &[
    DEFAULT_REACTION,
    CatReaction {
        mood: "playful",
        message: "Playful paws bat at invisible strings.",
    },
    CatReaction {
        mood: "comfy",
        message: "The cat settles into a comfy sit, soaking up the attention.",
    },
    CatReaction {
        mood: "wide-eyed",
        message: "Wide eyes sparkle as the cat awaits the next surprise.",
    },
    CatReaction {
        mood: "sneaky",
        message: "A crouched wiggle hints at a playful pounce in the making.",
    },
];

pub fn reaction_for(treat_name: &str) -> &'static CatReaction {
    TREAT_REACTIONS
        .iter()
        .find(|(name, _)| *name == treat_name)
        .map(|(_, reaction)| reaction)
        .unwrap_or(&DEFAULT_REACTION)
}
