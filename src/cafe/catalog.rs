//! Treat catalog: every bakeable treat keyed by its canonical ingredient key,
//! plus the two sentinel treats that live outside the keyed table.

use std::collections::HashMap;

pub const KEY_SEPARATOR: &str = "+";
pub const FALLBACK_KEY: &str = "mysterious-goo";
pub const REWARD_KEY: &str = "birthday-surprise-cake";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreatDefinition {
    /// Canonical key (sorted ingredient ids joined by `+`), or a sentinel key.
    pub key: String,
    pub name: String,
    pub art_ref: String,
    pub description: String,
    pub is_fallback: bool,
}

/// One row of a recipe table. `combo` may list its ingredients in any order.
pub struct RawRecipe {
    pub combo: &'static str,
    pub name: &'static str,
    pub art_ref: &'static str,
    pub description: &'static str,
}

pub const RECIPE_TABLE: &[RawRecipe] = &[
    RawRecipe {
        combo: "milk+fish",
        name: "Milky Tuna Tart",
        art_ref: "treats/milky_tuna_tart.png",
        description: "A creamy tart with a savory shimmer. The café cat circles excitedly.",
    },
    RawRecipe {
        combo: "flour+honey",
        name: "Honey Loaf",
        art_ref: "treats/honey_loaf.png",
        description: "A fluffy loaf dripping with golden sweetness. Perfect for teatime.",
    },
    RawRecipe {
        combo: "butter+catnip",
        name: "Butternip Cookie",
        art_ref: "treats/butternip_cookie.png",
        description: "A crisp cookie dusted in catnip sugar. Expect instant purrs!",
    },
    RawRecipe {
        combo: "milk+fish+honey",
        name: "Honeyed Fish Bites",
        art_ref: "treats/honeyed_fish_bites.png",
        description: "Sweet and savory fish morsels, glazed with golden honey. An irresistible treat!",
    },
    RawRecipe {
        combo: "flour+butter+catnip",
        name: "Fluffy Catnip Scones",
        art_ref: "treats/fluffy_catnip_scones.png",
        description: "Light, buttery scones infused with a hint of catnip. Purrfect for afternoon tea.",
    },
    RawRecipe {
        combo: "flour+catnip",
        name: "Catnip Cloud Crisps",
        art_ref: "treats/fluffy_catnip_scones.png",
        description: "Delicate crisps dusted with meadow catnip, baked light enough to lull any kitty into a purr.",
    },
    RawRecipe {
        combo: "milk+butter+honey",
        name: "Sweet Milkbread Twist",
        art_ref: "treats/sweet_milkbread_twist.png",
        description: "A soft, braided milk bread, drizzled with sweet honey butter. Comfort in every bite.",
    },
    RawRecipe {
        combo: "milk+flour+cream",
        name: "Cream Puff Pastry",
        art_ref: "treats/cream_puff_pastry.png",
        description: "A delicate puff filled with sweet cream. Light as air and twice as dreamy.",
    },
    RawRecipe {
        combo: "honey+catnip",
        name: "Golden Catnip Drops",
        art_ref: "treats/golden_catnip_drops.png",
        description: "Tiny honey-glazed treats that sparkle with catnip magic. Instant feline fascination!",
    },
    RawRecipe {
        combo: "flour+fish",
        name: "Savory Fish Crackers",
        art_ref: "treats/savory_fish_crackers.png",
        description: "Crisp, salty crackers baked with tender fish flakes. Perfect for sophisticated snackers.",
    },
    RawRecipe {
        combo: "milk+butter",
        name: "Velvet Cream Cookies",
        art_ref: "treats/velvet_cream_cookies.png",
        description: "Soft, melt-in-your-mouth cookies with a buttery milk glaze. Simple, smooth, and irresistible.",
    },
    RawRecipe {
        combo: "butter+honey",
        name: "Honey Butter Biscuits",
        art_ref: "treats/honey_butter_biscuits.png",
        description: "Golden biscuits infused with sweet honey butter. A comforting crunch in every bite.",
    },
    RawRecipe {
        combo: "flour+milk+catnip",
        name: "Whisker Waffles",
        art_ref: "treats/whisker_waffles.png",
        description: "Fluffy catnip-scented waffles drizzled with warm milk glaze. Breakfast for champions.",
    },
    RawRecipe {
        combo: "butter+fish+honey",
        name: "Golden Fish Pie",
        art_ref: "treats/golden_fish_pie.png",
        description: "A flaky golden pie filled with sweet-salty fish filling and a honey-brushed crust.",
    },
    RawRecipe {
        combo: "milk+flour+honey",
        name: "Sweet Cream Muffins",
        art_ref: "treats/sweet_cream_muffins.png",
        description: "Soft muffins bursting with honey sweetness and creamy richness. Best served warm!",
    },
    RawRecipe {
        combo: "flour+butter+honey",
        name: "Golden Shortbread",
        art_ref: "treats/golden_shortbread.png",
        description: "Buttery, crumbly cookies kissed with honey. A timeless teatime treasure.",
    },
    RawRecipe {
        combo: "milk+butter+catnip",
        name: "Dreamy Catnip Custard",
        art_ref: "treats/dreamy_custard.png",
        description: "A smooth custard with a playful catnip aroma. Silky, soothing, and a little mischievous.",
    },
];

pub struct Ingredient {
    pub id: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub flavor_note: &'static str,
}

/// Ingredients offered at the baking corner, in display order.
pub const INGREDIENTS: &[Ingredient] = &[
    Ingredient { id: "milk", icon: "🍶", label: "Milk", flavor_note: "silky foam" },
    Ingredient { id: "fish", icon: "🐟", label: "Fish", flavor_note: "savory crunch" },
    Ingredient { id: "honey", icon: "🍯", label: "Honey", flavor_note: "sunny glaze" },
    Ingredient { id: "catnip", icon: "🌿", label: "Catnip", flavor_note: "minty sparkle" },
    Ingredient { id: "butter", icon: "🧈", label: "Butter", flavor_note: "golden melt" },
    Ingredient { id: "flour", icon: "🌾", label: "Flour", flavor_note: "cloud-soft crumb" },
    Ingredient { id: "berries", icon: "🫐", label: "Berries", flavor_note: "twilight jam" },
    Ingredient { id: "cream", icon: "🍨", label: "Cream", flavor_note: "whipped snow" },
];

/// Display label for an ingredient id, or the id itself when unknown.
pub fn ingredient_label(id: &str) -> &str {
    INGREDIENTS
        .iter()
        .find(|i| i.id == id)
        .map(|i| i.label)
        .unwrap_or(id)
}

/// Build the canonical key: trim each token, drop empties, sort, join with `+`.
/// Repeated tokens are kept.
pub fn canonical_key<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parts: Vec<String> = tokens
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    parts.sort();
    parts.join(KEY_SEPARATOR)
}

fn fallback_treat() -> TreatDefinition {
    TreatDefinition {
        key: FALLBACK_KEY.to_string(),
        name: "Mysterious Goo".to_string(),
        art_ref: "treats/mysterious_goo.png".to_string(),
        description: "An unpredictable gooey blob. Maybe keep this one away from the rug for now..."
            .to_string(),
        is_fallback: true,
    }
}

fn reward_treat() -> TreatDefinition {
    TreatDefinition {
        key: REWARD_KEY.to_string(),
        name: "Birthday Surprise Cake".to_string(),
        art_ref: "treats/birthday_surprise.png".to_string(),
        description: "A towering confetti cake layered with honey glaze and shimmering catnip icing."
            .to_string(),
        is_fallback: false,
    }
}

pub struct Catalog {
    /// Bakeable treats in table order.
    treats: Vec<TreatDefinition>,
    index: HashMap<String, usize>,
    fallback: TreatDefinition,
    reward: TreatDefinition,
}

impl Catalog {
    /// The café's built-in recipe table.
    pub fn new() -> Self {
        Self::from_table(RECIPE_TABLE)
    }

    /// Canonicalise every row of `table`. When two rows share a canonical key
    /// the later row wins and takes over the earlier row's position.
    pub fn from_table(table: &[RawRecipe]) -> Self {
        let mut treats: Vec<TreatDefinition> = Vec::with_capacity(table.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for raw in table {
            let key = canonical_key(raw.combo.split(KEY_SEPARATOR));
            let treat = TreatDefinition {
                key: key.clone(),
                name: raw.name.to_string(),
                art_ref: raw.art_ref.to_string(),
                description: raw.description.to_string(),
                is_fallback: false,
            };
            match index.get(&key) {
                Some(&pos) => {
                    log::warn!(
                        "recipe `{}` overwrites `{}` (both canonicalise to `{key}`)",
                        raw.name,
                        treats[pos].name
                    );
                    treats[pos] = treat;
                }
                None => {
                    index.insert(key, treats.len());
                    treats.push(treat);
                }
            }
        }

        Self {
            treats,
            index,
            fallback: fallback_treat(),
            reward: reward_treat(),
        }
    }

    /// Any bakeable or sentinel key. Unknown keys get the fallback treat.
    pub fn lookup_by_key(&self, key: &str) -> &TreatDefinition {
        if let Some(&pos) = self.index.get(key) {
            return &self.treats[pos];
        }
        match key {
            REWARD_KEY => &self.reward,
            _ => &self.fallback,
        }
    }

    /// Bakeable keys only; the sentinels are not recipes.
    pub fn is_recipe(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn all_treats(&self) -> &[TreatDefinition] {
        &self.treats
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TreatDefinition> {
        self.treats.iter().find(|t| t.name == name)
    }

    /// Bakeable treats sorted by display name.
    pub fn recipe_book(&self) -> Vec<&TreatDefinition> {
        let mut pages: Vec<&TreatDefinition> = self.treats.iter().collect();
        pages.sort_by(|a, b| a.name.cmp(&b.name));
        pages
    }

    pub fn fallback(&self) -> &TreatDefinition {
        &self.fallback
    }

    pub fn reward(&self) -> &TreatDefinition {
        &self.reward
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
