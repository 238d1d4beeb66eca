//! Catalog backed by a RON document, with a bundled Generation-1 data set.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{DamageRelations, MoveData, SpeciesData, TypeData};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{normalize_key, CatalogError, CatalogResult, CreatureCatalog};

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.ron");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    species: Vec<SpeciesData>,
    moves: Vec<MoveData>,
    types: Vec<TypeData>,
}

pub struct RonCatalog {
    species: Vec<SpeciesData>,
    species_index: HashMap<String, usize>,
    moves: HashMap<String, MoveData>,
    types: HashMap<String, DamageRelations>,
    rng: Mutex<StdRng>,
}

impl RonCatalog {
    /// Parse a catalog document. `seed` fixes the sequence of random species.
    pub fn from_ron_str(document: &str, seed: Option<u64>) -> CatalogResult<Self> {
        let document: CatalogDocument =
            ron::from_str(document).map_err(|e| CatalogError::Malformed(e.to_string()))?;

        let species_index = document
            .species
            .iter()
            .enumerate()
            .map(|(i, s)| (normalize_key(&s.name), i))
            .collect();
        let moves = document
            .moves
            .into_iter()
            .map(|m| (normalize_key(&m.name), m))
            .collect();
        let types = document
            .types
            .into_iter()
            .map(|t| (normalize_key(&t.name), t.damage_relations))
            .collect();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            species: document.species,
            species_index,
            moves,
            types,
            rng: Mutex::new(rng),
        })
    }

    pub fn bundled(seed: Option<u64>) -> CatalogResult<Self> {
        Self::from_ron_str(BUNDLED_CATALOG, seed)
    }

    pub fn species_names(&self) -> Vec<&str> {
        self.species.iter().map(|s| s.name.as_str()).collect()
    }
}

#[async_trait]
impl CreatureCatalog for RonCatalog {
    async fn fetch_random_species(&self) -> CatalogResult<SpeciesData> {
        if self.species.is_empty() {
            return Err(CatalogError::Empty);
        }
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.random_range(0..self.species.len())
        };
        Ok(self.species[index].clone())
    }

    async fn fetch_species_by_name(&self, name: &str) -> CatalogResult<SpeciesData> {
        self.species_index
            .get(&normalize_key(name))
            .map(|&i| self.species[i].clone())
            .ok_or_else(|| CatalogError::UnknownSpecies(name.to_string()))
    }

    async fn fetch_type_relations(&self, type_name: &str) -> CatalogResult<DamageRelations> {
        self.types
            .get(&normalize_key(type_name))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownType(type_name.to_string()))
    }

    async fn fetch_move_details(&self, move_ref: &str) -> CatalogResult<MoveData> {
        self.moves
            .get(&normalize_key(move_ref))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownMove(move_ref.to_string()))
    }
}
