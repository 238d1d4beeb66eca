use serde::{Deserialize, Serialize};

/// Damage relations of a single elemental type, as published by the catalog.
///
/// Only the `*_from` sets matter for damage: they describe how this type
/// reacts when it is the *defending* type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRelations {
    #[serde(default)]
    pub double_damage_from: Vec<String>,
    #[serde(default)]
    pub half_damage_from: Vec<String>,
    #[serde(default)]
    pub no_damage_from: Vec<String>,
    #[serde(default)]
    pub double_damage_to: Vec<String>,
    #[serde(default)]
    pub half_damage_to: Vec<String>,
    #[serde(default)]
    pub no_damage_to: Vec<String>,
}

impl DamageRelations {
    pub fn takes_double_from(&self, attacking: &str) -> bool {
        self.double_damage_from.iter().any(|t| t == attacking)
    }

    pub fn takes_half_from(&self, attacking: &str) -> bool {
        self.half_damage_from.iter().any(|t| t == attacking)
    }

    pub fn immune_to(&self, attacking: &str) -> bool {
        self.no_damage_from.iter().any(|t| t == attacking)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeData {
    pub name: String,
    pub damage_relations: DamageRelations,
}
