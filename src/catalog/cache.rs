//! Fetch-once cache in front of a [`CreatureCatalog`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use schema::{MoveData, SpeciesData, TypeData};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::errors::{EncounterError, EncounterResult};
use crate::species::Species;

use super::{normalize_key, CatalogError, CreatureCatalog, ReferenceBook};

type Cells<T> = Mutex<HashMap<String, Arc<OnceCell<T>>>>;

/// Caches species, moves and type relations by natural key.
///
/// Each key is fetched at most once: concurrent callers for the same key
/// await the same fetch. A failed fetch is not cached, so the next caller
/// tries again; nothing is retried automatically.
pub struct CatalogCache {
    catalog: Arc<dyn CreatureCatalog>,
    species_cells: Cells<Arc<Species>>,
    move_cells: Cells<MoveData>,
    type_cells: Cells<()>,
    book: RwLock<ReferenceBook>,
}

impl CatalogCache {
    pub fn new(catalog: Arc<dyn CreatureCatalog>) -> Self {
        Self {
            catalog,
            species_cells: Mutex::new(HashMap::new()),
            move_cells: Mutex::new(HashMap::new()),
            type_cells: Mutex::new(HashMap::new()),
            book: RwLock::new(ReferenceBook::new()),
        }
    }

    /// Everything loaded so far. Later loads do not affect the returned snapshot.
    pub fn snapshot(&self) -> ReferenceBook {
        self.book
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cached_species(&self, name: &str) -> Option<Arc<Species>> {
        self.snapshot().species(name).cloned()
    }

    /// Resolve a species by name, with its types and known moves.
    pub async fn species(&self, name: &str) -> EncounterResult<Arc<Species>> {
        let key = normalize_key(name);
        let cell = Self::cell(&self.species_cells, &key);
        if let Some(species) = cell.get() {
            debug!(species = %key, "species cache hit");
            return Ok(species.clone());
        }

        let species = cell
            .get_or_try_init(|| async {
                debug!(species = %key, "fetching species");
                let data = self.catalog.fetch_species_by_name(&key).await?;
                let species = self.build_species(data).await?;
                Ok::<_, EncounterError>(species)
            })
            .await?;
        Ok(species.clone())
    }

    /// Pick a random species from the catalog and resolve it.
    ///
    /// If the picked species is already cached, the cached entry wins.
    pub async fn random_species(&self) -> EncounterResult<Arc<Species>> {
        let data = self.catalog.fetch_random_species().await?;
        let key = normalize_key(&data.name);
        debug!(species = %key, "random species picked");

        let cell = Self::cell(&self.species_cells, &key);
        let species = cell.get_or_try_init(|| self.build_species(data)).await?;
        Ok(species.clone())
    }

    pub async fn move_details(&self, name: &str) -> EncounterResult<MoveData> {
        let key = normalize_key(name);
        let cell = Self::cell(&self.move_cells, &key);
        let move_data = cell
            .get_or_try_init(|| async {
                debug!(move_name = %key, "fetching move");
                let move_data = self.catalog.fetch_move_details(&key).await?;
                {
                    let mut book = self.book.write().unwrap_or_else(PoisonError::into_inner);
                    book.insert_move(move_data.clone());
                }
                Ok::<_, CatalogError>(move_data)
            })
            .await?;
        Ok(move_data.clone())
    }

    /// Load a type's damage relations. A type that cannot be loaded stays
    /// neutral in every multiplier.
    async fn ensure_type(&self, name: &str) {
        let key = normalize_key(name);
        let cell = Self::cell(&self.type_cells, &key);
        let result = cell
            .get_or_try_init(|| async {
                debug!(type_name = %key, "fetching type relations");
                let relations = self.catalog.fetch_type_relations(&key).await?;
                {
                    let mut book = self.book.write().unwrap_or_else(PoisonError::into_inner);
                    book.insert_type(TypeData {
                        name: key.clone(),
                        damage_relations: relations,
                    });
                }
                Ok::<_, CatalogError>(())
            })
            .await;

        if let Err(err) = result {
            warn!(type_name = %key, error = %err, "type relations unavailable, treating as neutral");
        }
    }

    async fn build_species(&self, data: SpeciesData) -> EncounterResult<Arc<Species>> {
        for type_name in &data.types {
            self.ensure_type(type_name).await;
        }

        let mut moves = Vec::new();
        for move_name in data.moves.iter().take(Species::MAX_MOVES) {
            let move_data = self.move_details(move_name).await?;
            self.ensure_type(&move_data.move_type).await;
            moves.push(move_data);
        }

        let species = Species::from_data(data, moves);
        let stored = {
            let mut book = self.book.write().unwrap_or_else(PoisonError::into_inner);
            book.insert_species(species)
        };
        debug!(species = %stored.name, moves = stored.moves.len(), "species stored");
        Ok(stored)
    }

    fn cell<T>(cells: &Cells<T>, key: &str) -> Arc<OnceCell<T>> {
        let mut cells = cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.entry(key.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogResult, RonCatalog};
    use crate::errors::ErrorKind;
    use async_trait::async_trait;
    use schema::DamageRelations;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts fetches and can be told to fail the next few species lookups.
    struct CountingCatalog {
        inner: RonCatalog,
        species_fetches: AtomicUsize,
        move_fetches: AtomicUsize,
        failures_left: AtomicUsize,
        fail_types: bool,
    }

    impl CountingCatalog {
        fn new(failures: usize, fail_types: bool) -> Self {
            Self {
                inner: RonCatalog::bundled(Some(3)).unwrap(),
                species_fetches: AtomicUsize::new(0),
                move_fetches: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(failures),
                fail_types,
            }
        }
    }

    #[async_trait]
    impl CreatureCatalog for CountingCatalog {
        async fn fetch_random_species(&self) -> CatalogResult<SpeciesData> {
            self.inner.fetch_random_species().await
        }

        async fn fetch_species_by_name(&self, name: &str) -> CatalogResult<SpeciesData> {
            self.species_fetches.fetch_add(1, Ordering::SeqCst);
            let should_fail = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(CatalogError::Unavailable("connection reset".to_string()));
            }
            tokio::task::yield_now().await;
            self.inner.fetch_species_by_name(name).await
        }

        async fn fetch_type_relations(&self, type_name: &str) -> CatalogResult<DamageRelations> {
            if self.fail_types {
                return Err(CatalogError::Unavailable("types offline".to_string()));
            }
            self.inner.fetch_type_relations(type_name).await
        }

        async fn fetch_move_details(&self, move_ref: &str) -> CatalogResult<MoveData> {
            self.move_fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_move_details(move_ref).await
        }
    }

    #[tokio::test]
    async fn test_species_is_fetched_once() {
        let catalog = Arc::new(CountingCatalog::new(0, false));
        let cache = CatalogCache::new(catalog.clone());

        let (a, b) = tokio::join!(cache.species("squirtle"), cache.species("Squirtle"));
        let a = a.unwrap();
        let b = b.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        cache.species("squirtle").await.unwrap();

        assert_eq!(catalog.species_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(a.moves.len(), 4);
        assert!(cache.snapshot().types().contains("water"));
    }

    #[tokio::test]
    async fn test_shared_moves_are_fetched_once() {
        let catalog = Arc::new(CountingCatalog::new(0, false));
        let cache = CatalogCache::new(catalog.clone());

        // Both know tackle and tail-whip.
        cache.species("squirtle").await.unwrap();
        let before = catalog.move_fetches.load(Ordering::SeqCst);
        cache.species("eevee").await.unwrap();
        let after = catalog.move_fetches.load(Ordering::SeqCst);

        assert_eq!(before, 4);
        assert_eq!(after - before, 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let catalog = Arc::new(CountingCatalog::new(1, false));
        let cache = CatalogCache::new(catalog.clone());

        let err = cache.species("pikachu").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(cache.cached_species("pikachu").is_none());

        let pikachu = cache.species("pikachu").await.unwrap();
        assert_eq!(pikachu.name, "pikachu");
        assert_eq!(catalog.species_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_species_is_not_found() {
        let cache = CatalogCache::new(Arc::new(CountingCatalog::new(0, false)));
        let err = cache.species("digimon").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_missing_type_relations_fail_open() {
        let cache = CatalogCache::new(Arc::new(CountingCatalog::new(0, true)));
        let species = cache.species("charmander").await.unwrap();
        let book = cache.snapshot();
        assert!(book.types().is_empty());
        assert_eq!(book.types().combined_multiplier("water", &species.types), 1.0);
    }

    #[tokio::test]
    async fn test_random_species_reuses_cache() {
        let catalog = Arc::new(CountingCatalog::new(0, false));
        let cache = CatalogCache::new(catalog.clone());
        let species = cache.random_species().await.unwrap();
        let again = cache.species(&species.name).await.unwrap();
        assert!(Arc::ptr_eq(&species, &again));
        assert_eq!(catalog.species_fetches.load(Ordering::SeqCst), 0);
    }
}
