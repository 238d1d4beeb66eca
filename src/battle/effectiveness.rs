use schema::{DamageRelations, TypeData};
use std::collections::HashMap;

/// Damage relations of every elemental type loaded so far, keyed by type name.
///
/// A type with no entry is treated as neutral, so a missing relation can
/// never block a battle.
#[derive(Debug, Clone, Default)]
pub struct TypeEffectivenessTable {
    relations: HashMap<String, DamageRelations>,
}

impl TypeEffectivenessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_name: &str, relations: DamageRelations) {
        self.relations.insert(type_name.to_lowercase(), relations);
    }

    pub fn insert_type(&mut self, data: TypeData) {
        self.insert(&data.name, data.damage_relations);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.relations.contains_key(&type_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Multiplier of `attacking` against a single defending type.
    ///
    /// The sets are checked in order double, half, none, so a type listed in
    /// more than one set takes the first match.
    pub fn multiplier(&self, attacking: &str, defending: &str) -> f64 {
        let attacking = attacking.to_lowercase();
        let Some(relations) = self.relations.get(&defending.to_lowercase()) else {
            return 1.0;
        };

        if relations.takes_double_from(&attacking) {
            2.0
        } else if relations.takes_half_from(&attacking) {
            0.5
        } else if relations.immune_to(&attacking) {
            0.0
        } else {
            1.0
        }
    }

    /// Product of the per-type multipliers over every defending type.
    pub fn combined_multiplier<S: AsRef<str>>(&self, attacking: &str, defending: &[S]) -> f64 {
        defending
            .iter()
            .map(|t| self.multiplier(attacking, t.as_ref()))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn relations(double: &[&str], half: &[&str], none: &[&str]) -> DamageRelations {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        DamageRelations {
            double_damage_from: owned(double),
            half_damage_from: owned(half),
            no_damage_from: owned(none),
            ..DamageRelations::default()
        }
    }

    fn table() -> TypeEffectivenessTable {
        let mut table = TypeEffectivenessTable::new();
        table.insert("water", relations(&["electric", "grass"], &["fire", "water", "ice", "steel"], &[]));
        table.insert("flying", relations(&["electric", "ice", "rock"], &["grass", "fighting", "bug"], &["ground"]));
        table.insert("ghost", relations(&["ghost", "dark"], &["poison", "bug"], &["normal", "fighting"]));
        table.insert("rock", relations(&["water", "grass"], &["normal", "fire"], &[]));
        table
    }

    #[rstest]
    #[case("electric", "water", 2.0)]
    #[case("fire", "water", 0.5)]
    #[case("normal", "ghost", 0.0)]
    #[case("normal", "water", 1.0)]
    #[case("fire", "dragon", 1.0)]
    fn test_single_type_multiplier(
        #[case] attacking: &str,
        #[case] defending: &str,
        #[case] expected: f64,
    ) {
        assert_eq!(table().multiplier(attacking, defending), expected);
    }

    #[test]
    fn test_dual_type_product() {
        let table = table();
        assert_eq!(table.combined_multiplier("electric", &["water", "flying"]), 4.0);
        assert_eq!(table.combined_multiplier("ground", &["water", "flying"]), 0.0);
        assert_eq!(table.combined_multiplier("grass", &["water", "rock"]), 4.0);
        assert_eq!(table.combined_multiplier("fire", &["water", "rock"]), 0.25);
    }

    #[test]
    fn test_order_of_defending_types_does_not_matter() {
        let table = table();
        for attacking in ["electric", "grass", "fire", "ground", "normal"] {
            assert_eq!(
                table.combined_multiplier(attacking, &["water", "flying"]),
                table.combined_multiplier(attacking, &["flying", "water"])
            );
        }
    }

    #[test]
    fn test_first_matching_set_wins() {
        let mut table = TypeEffectivenessTable::new();
        table.insert("odd", relations(&["fire"], &["fire"], &["fire"]));
        assert_eq!(table.multiplier("fire", "odd"), 2.0);
    }

    #[test]
    fn test_empty_relations_are_neutral() {
        let mut table = TypeEffectivenessTable::new();
        table.insert("normal", DamageRelations::default());
        assert!(table.contains("Normal"));
        assert_eq!(table.combined_multiplier("fighting", &["normal"]), 1.0);
        assert_eq!(table.combined_multiplier::<&str>("fighting", &[]), 1.0);
    }
}
