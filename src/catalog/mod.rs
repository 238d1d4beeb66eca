//! Reference data about species, moves and elemental types.
//!
//! A [`CreatureCatalog`] is the slow, possibly remote source of truth. The
//! [`CatalogCache`] in front of it fetches every natural key at most once and
//! hands the engine a cheap [`ReferenceBook`] snapshot.

pub mod book;
pub mod cache;
pub mod error;
pub mod offline;

use async_trait::async_trait;
use schema::{DamageRelations, MoveData, SpeciesData};

pub use book::ReferenceBook;
pub use cache::CatalogCache;
pub use error::{CatalogError, CatalogResult};
pub use offline::RonCatalog;

/// Source of species, move and type reference data.
#[async_trait]
pub trait CreatureCatalog: Send + Sync {
    /// Pick a species for a wild encounter.
    async fn fetch_random_species(&self) -> CatalogResult<SpeciesData>;

    async fn fetch_species_by_name(&self, name: &str) -> CatalogResult<SpeciesData>;

    async fn fetch_type_relations(&self, type_name: &str) -> CatalogResult<DamageRelations>;

    async fn fetch_move_details(&self, move_ref: &str) -> CatalogResult<MoveData>;
}

/// Catalog keys are case-insensitive.
pub(crate) fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}
