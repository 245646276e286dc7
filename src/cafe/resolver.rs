//! Ingredient selection → treat. Pure; never fails.

use super::catalog::{canonical_key, Catalog, TreatDefinition};

/// Resolve a selection of ingredient ids against the catalog's bakeable recipes.
///
/// Order does not matter. Cardinality is not checked here; the baking corner
/// only allows 2 or 3 distinct ingredients. An empty selection resolves to
/// key `""`, which matches nothing. Sentinel keys are not bakeable, so an id
/// such as `"mysterious-goo"` also resolves to the fallback.
pub fn resolve<'c, S: AsRef<str>>(catalog: &'c Catalog, ingredient_ids: &[S]) -> &'c TreatDefinition {
    let key = canonical_key(ingredient_ids);
    if catalog.is_recipe(&key) {
        catalog.lookup_by_key(&key)
    } else {
        catalog.fallback()
    }
}
