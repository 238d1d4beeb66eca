//! In-memory EncounterRepository implementation for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::auth::UserId;
use crate::battle::state::{Battle, BattleDraft, BattleId};
use crate::pokemon::{CreatureInstance, InstanceId, NewInstance};
use crate::repository::{EncounterRepository, RepositoryError, Result};

#[derive(Debug, Default)]
struct Store {
    battles: HashMap<BattleId, Battle>,
    instances: BTreeMap<InstanceId, CreatureInstance>,
    last_battle_id: u64,
    last_instance_id: u64,
}

impl Store {
    fn owns_species(&self, owner: UserId, species: &str) -> bool {
        self.instances
            .values()
            .any(|p| p.owner == owner && p.species.eq_ignore_ascii_case(species))
    }

    fn check_instances(&self, instances: &[CreatureInstance]) -> Result<()> {
        for instance in instances {
            match self.instances.get(&instance.id) {
                Some(stored) if stored.owner == instance.owner => {}
                _ => return Err(RepositoryError::MissingInstance(instance.id)),
            }
        }
        Ok(())
    }

    fn store_new(&mut self, new_instance: NewInstance) -> Result<CreatureInstance> {
        if self.owns_species(new_instance.owner, &new_instance.species) {
            return Err(RepositoryError::DuplicateSpecies {
                owner: new_instance.owner,
                species: new_instance.species,
            });
        }
        self.last_instance_id += 1;
        let instance = new_instance.into_instance(InstanceId(self.last_instance_id));
        self.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }
}

/// In-memory implementation of EncounterRepository.
///
/// Ids are assigned sequentially starting at 1.
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EncounterRepository for InMemoryRepository {
    fn load_battle(&self, owner: UserId, id: BattleId) -> Result<Option<Battle>> {
        let store = self.store.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(store.battles.get(&id).filter(|b| b.owner == owner).cloned())
    }

    fn insert_battle(&self, draft: BattleDraft) -> Result<Battle> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;
        store.last_battle_id += 1;
        let battle = draft.into_battle(BattleId(store.last_battle_id));
        store.battles.insert(battle.id, battle.clone());
        Ok(battle)
    }

    fn save_battle(&self, battle: &Battle) -> Result<()> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;
        match store.battles.get_mut(&battle.id) {
            Some(stored) if stored.owner == battle.owner => {
                *stored = battle.clone();
                Ok(())
            }
            _ => Err(RepositoryError::MissingBattle(battle.id)),
        }
    }

    fn active_battles_for(&self, owner: UserId) -> Result<Vec<Battle>> {
        let store = self.store.read().map_err(|_| RepositoryError::LockPoisoned)?;
        let mut battles: Vec<Battle> = store
            .battles
            .values()
            .filter(|b| b.owner == owner && b.is_active())
            .cloned()
            .collect();
        battles.sort_by_key(|b| b.id);
        Ok(battles)
    }

    fn load_instance(&self, owner: UserId, id: InstanceId) -> Result<Option<CreatureInstance>> {
        let store = self.store.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(store.instances.get(&id).filter(|p| p.owner == owner).cloned())
    }

    fn insert_instance(&self, new_instance: NewInstance) -> Result<CreatureInstance> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;
        store.store_new(new_instance)
    }

    fn save_instance(&self, instance: &CreatureInstance) -> Result<()> {
        self.save_instances(std::slice::from_ref(instance))
    }

    fn save_instances(&self, instances: &[CreatureInstance]) -> Result<()> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;
        store.check_instances(instances)?;
        for instance in instances {
            store.instances.insert(instance.id, instance.clone());
        }
        Ok(())
    }

    fn delete_instance(&self, owner: UserId, id: InstanceId) -> Result<bool> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if store.instances.get(&id).is_some_and(|p| p.owner == owner) {
            store.instances.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn instances_for(&self, owner: UserId) -> Result<Vec<CreatureInstance>> {
        let store = self.store.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(store
            .instances
            .values()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    fn commit(
        &self,
        battle: &Battle,
        instances: &[CreatureInstance],
        capture: Option<NewInstance>,
    ) -> Result<Option<CreatureInstance>> {
        let mut store = self.store.write().map_err(|_| RepositoryError::LockPoisoned)?;

        // Validate everything before the first write.
        if !store
            .battles
            .get(&battle.id)
            .is_some_and(|b| b.owner == battle.owner)
        {
            return Err(RepositoryError::MissingBattle(battle.id));
        }
        store.check_instances(instances)?;
        if let Some(new_instance) = &capture {
            if store.owns_species(new_instance.owner, &new_instance.species) {
                return Err(RepositoryError::DuplicateSpecies {
                    owner: new_instance.owner,
                    species: new_instance.species.clone(),
                });
            }
        }

        store.battles.insert(battle.id, battle.clone());
        for instance in instances {
            store.instances.insert(instance.id, instance.clone());
        }
        capture.map(|new_instance| store.store_new(new_instance)).transpose()
    }
}
