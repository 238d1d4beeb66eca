//! Out-of-battle healing and the roster health report.

use crate::auth::UserId;
use crate::catalog::ReferenceBook;
use crate::errors::{EncounterError, EncounterResult};
use crate::pokemon::{CreatureInstance, HealthCondition, InstanceId};
use crate::repository::EncounterRepository;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureHealth {
    pub id: InstanceId,
    pub species: String,
    pub current_hp: u16,
    pub max_hp: u16,
    pub condition: HealthCondition,
    pub on_team: bool,
}

/// Health of every creature a player owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total: usize,
    /// Creatures still standing, injured or not.
    pub standing: usize,
    pub injured: usize,
    pub fainted: usize,
    pub creatures: Vec<CreatureHealth>,
}

/// Restores HP using species data from `book`, which must already hold
/// every species the player owns.
pub struct HealingService<'a> {
    repo: &'a dyn EncounterRepository,
    book: &'a ReferenceBook,
}

impl<'a> HealingService<'a> {
    pub fn new(repo: &'a dyn EncounterRepository, book: &'a ReferenceBook) -> Self {
        Self { repo, book }
    }

    fn max_hp(&self, instance: &CreatureInstance) -> EncounterResult<u16> {
        Ok(self.book.require_species(&instance.species)?.max_hp())
    }

    fn load(&self, owner: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        self.repo
            .load_instance(owner, id)?
            .ok_or_else(|| EncounterError::not_found(format!("creature {}", id)))
    }

    /// Restore every owned creature to full HP. Returns how many creatures the player owns.
    pub fn heal_all(&self, owner: UserId) -> EncounterResult<usize> {
        let mut instances = self.repo.instances_for(owner)?;
        for instance in &mut instances {
            let max_hp = self.max_hp(instance)?;
            instance.restore_full(max_hp);
        }
        self.repo.save_instances(&instances)?;
        info!(%owner, count = instances.len(), "healed all creatures");
        Ok(instances.len())
    }

    pub fn heal_one(&self, owner: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        let mut instance = self.load(owner, id)?;
        let max_hp = self.max_hp(&instance)?;
        instance.restore_full(max_hp);
        self.repo.save_instance(&instance)?;
        Ok(instance)
    }

    /// Bring a fainted creature back at half HP. A creature still standing is left as is.
    pub fn revive_one(&self, owner: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        let mut instance = self.load(owner, id)?;
        let max_hp = self.max_hp(&instance)?;
        if instance.revive(max_hp) {
            self.repo.save_instance(&instance)?;
            info!(%owner, creature = %id, hp = instance.current_hp, "creature revived");
        }
        Ok(instance)
    }

    /// Revive every fainted creature. Returns how many were revived.
    pub fn revive_all(&self, owner: UserId) -> EncounterResult<usize> {
        let mut revived = Vec::new();
        for mut instance in self.repo.instances_for(owner)? {
            let max_hp = self.max_hp(&instance)?;
            if instance.revive(max_hp) {
                revived.push(instance);
            }
        }
        self.repo.save_instances(&revived)?;
        info!(%owner, count = revived.len(), "revived fainted creatures");
        Ok(revived.len())
    }

    pub fn health_report(&self, owner: UserId) -> EncounterResult<HealthReport> {
        let creatures = self
            .repo
            .instances_for(owner)?
            .into_iter()
            .map(|instance| -> EncounterResult<CreatureHealth> {
                let max_hp = self.max_hp(&instance)?;
                Ok(CreatureHealth {
                    id: instance.id,
                    condition: instance.condition(max_hp),
                    species: instance.species,
                    current_hp: instance.current_hp,
                    max_hp,
                    on_team: instance.on_team,
                })
            })
            .collect::<EncounterResult<Vec<_>>>()?;

        let count = |condition: HealthCondition| {
            creatures
                .iter()
                .filter(|c| c.condition == condition)
                .count()
        };
        let injured = count(HealthCondition::Injured);
        let fainted = count(HealthCondition::Fainted);

        Ok(HealthReport {
            total: creatures.len(),
            standing: creatures.len() - fainted,
            injured,
            fainted,
            creatures,
        })
    }
}
