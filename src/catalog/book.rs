use crate::battle::effectiveness::TypeEffectivenessTable;
use crate::errors::{EncounterError, EncounterResult};
use crate::species::{MoveData, Species};
use schema::TypeData;
use std::collections::HashMap;
use std::sync::Arc;

use super::normalize_key;

/// Immutable snapshot of all reference data loaded so far.
///
/// Cloning is cheap: the maps are shared, and writers copy them on change.
#[derive(Debug, Clone, Default)]
pub struct ReferenceBook {
    species: Arc<HashMap<String, Arc<Species>>>,
    moves: Arc<HashMap<String, MoveData>>,
    types: Arc<TypeEffectivenessTable>,
}

impl ReferenceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(&self, name: &str) -> Option<&Arc<Species>> {
        self.species.get(&normalize_key(name))
    }

    /// Like [`species`](Self::species), for species the caller expects to be loaded.
    pub fn require_species(&self, name: &str) -> EncounterResult<&Arc<Species>> {
        self.species(name).ok_or_else(|| {
            EncounterError::ServiceUnavailable(format!("species '{}' is not loaded", name))
        })
    }

    pub fn move_data(&self, name: &str) -> Option<&MoveData> {
        self.moves.get(&normalize_key(name))
    }

    pub fn types(&self) -> &TypeEffectivenessTable {
        &self.types
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn insert_species(&mut self, species: Species) -> Arc<Species> {
        let moves = Arc::make_mut(&mut self.moves);
        for known in &species.moves {
            moves.insert(normalize_key(&known.name), known.clone());
        }
        let species = Arc::new(species);
        Arc::make_mut(&mut self.species).insert(normalize_key(&species.name), species.clone());
        species
    }

    pub fn insert_move(&mut self, move_data: MoveData) {
        Arc::make_mut(&mut self.moves).insert(normalize_key(&move_data.name), move_data);
    }

    pub fn insert_type(&mut self, data: TypeData) {
        Arc::make_mut(&mut self.types).insert_type(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{BaseStats, SpeciesData, Sprites};
    use schema::DamageRelations;

    fn species(name: &str) -> Species {
        Species::from_data(
            SpeciesData {
                name: name.to_string(),
                base_stats: BaseStats {
                    hp: 40,
                    attack: 45,
                    defense: 40,
                    sp_attack: 35,
                    sp_defense: 35,
                    speed: 56,
                },
                types: vec!["normal".to_string(), "flying".to_string()],
                base_experience: 50,
                height: 3,
                weight: 18,
                sprites: Sprites::default(),
                moves: vec!["gust".to_string()],
            },
            vec![MoveData {
                name: "gust".to_string(),
                power: Some(40),
                pp: 35,
                accuracy: Some(100),
                move_type: "flying".to_string(),
            }],
        )
    }

    #[test]
    fn test_snapshots_are_isolated_from_later_inserts() {
        let mut book = ReferenceBook::new();
        book.insert_species(species("pidgey"));
        let snapshot = book.clone();

        book.insert_species(species("spearow"));
        book.insert_type(TypeData {
            name: "flying".to_string(),
            damage_relations: DamageRelations::default(),
        });

        assert!(snapshot.species("spearow").is_none());
        assert!(snapshot.types().is_empty());
        assert_eq!(book.species_count(), 2);
        assert!(book.types().contains("flying"));
    }

    #[test]
    fn test_species_moves_are_indexed() {
        let mut book = ReferenceBook::new();
        book.insert_species(species("Pidgey"));
        assert!(book.move_data("GUST").is_some());
        assert!(book.require_species("pidgey").is_ok());
        assert!(book.require_species("mew").is_err());
    }
}
