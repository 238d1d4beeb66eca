use crate::auth::UserId;
use crate::battle::commands::BattleCommand;
use crate::battle::context::EncounterContext;
use crate::config::EncounterConfig;
use crate::errors::{EncounterError, EncounterResult, Resource};
use crate::player::Roster;
use crate::pokemon::{CreatureInstance, InstanceId};
use crate::repository::EncounterRepository;
use tracing::info;

/// Team and reserve bookkeeping for one player's creatures.
///
/// The team holds at most `team_capacity` creatures and the reserve at most
/// `reserve_capacity`; operations that would exceed either are rejected.
pub struct TeamManager<'a> {
    repo: &'a dyn EncounterRepository,
    config: &'a EncounterConfig,
}

impl<'a> TeamManager<'a> {
    pub fn new(repo: &'a dyn EncounterRepository, config: &'a EncounterConfig) -> Self {
        Self { repo, config }
    }

    pub fn roster(&self, owner: UserId) -> EncounterResult<Roster> {
        Ok(Roster::from_instances(self.repo.instances_for(owner)?))
    }

    fn load(&self, owner: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        self.repo
            .load_instance(owner, id)?
            .ok_or_else(|| EncounterError::not_found(format!("creature {}", id)))
    }

    /// A creature fighting in an unfinished battle stays on the team until
    /// that battle ends or it is switched out.
    fn ensure_not_fighting(&self, instance: &CreatureInstance) -> EncounterResult<()> {
        let battles = self.repo.active_battles_for(instance.owner)?;
        match battles
            .iter()
            .find(|b| b.active_instance == Some(instance.id))
        {
            Some(battle) => Err(EncounterError::invalid(format!(
                "{} is fighting in battle {}, switch it out first",
                instance.species, battle.id
            ))),
            None => Ok(()),
        }
    }

    /// Move a creature between team and reserve.
    pub fn toggle_membership(
        &self,
        owner: UserId,
        id: InstanceId,
    ) -> EncounterResult<CreatureInstance> {
        let mut instance = self.load(owner, id)?;
        let roster = self.roster(owner)?;

        if instance.on_team {
            self.ensure_not_fighting(&instance)?;
            if roster.reserve.len() >= self.config.reserve_capacity {
                return Err(EncounterError::ResourceExhausted(Resource::ReserveSlots));
            }
        } else if roster.team.len() >= self.config.team_capacity {
            return Err(EncounterError::ResourceExhausted(Resource::TeamSlots));
        }

        instance.on_team = !instance.on_team;
        self.repo.save_instance(&instance)?;
        info!(%owner, creature = %instance.id, on_team = instance.on_team, "membership toggled");
        Ok(instance)
    }

    /// Exchange a team member with a reserve creature. Sizes stay unchanged.
    pub fn swap(
        &self,
        owner: UserId,
        team_id: InstanceId,
        reserve_id: InstanceId,
    ) -> EncounterResult<(CreatureInstance, CreatureInstance)> {
        let mut outgoing = self.load(owner, team_id)?;
        let mut incoming = self.load(owner, reserve_id)?;
        if !outgoing.on_team {
            return Err(EncounterError::not_found(format!(
                "team creature {}",
                team_id
            )));
        }
        if incoming.on_team {
            return Err(EncounterError::not_found(format!(
                "reserve creature {}",
                reserve_id
            )));
        }
        self.ensure_not_fighting(&outgoing)?;

        outgoing.on_team = false;
        incoming.on_team = true;
        self.repo
            .save_instances(&[outgoing.clone(), incoming.clone()])?;
        info!(%owner, outgoing = %outgoing.id, incoming = %incoming.id, "team swap");
        Ok((outgoing, incoming))
    }

    /// Permanently remove a creature. The active creature of an unfinished
    /// battle cannot be released.
    pub fn release(&self, owner: UserId, id: InstanceId) -> EncounterResult<CreatureInstance> {
        let instance = self.load(owner, id)?;
        self.ensure_not_fighting(&instance)?;
        if !self.repo.delete_instance(owner, id)? {
            return Err(EncounterError::not_found(format!("creature {}", id)));
        }
        info!(%owner, creature = %id, species = %instance.species, "creature released");
        Ok(instance)
    }
}

/// Commands that make `target` the active creature of the battle in `ctx`.
///
/// The target must belong to the player, be on the team, still be standing
/// and not already be fighting.
pub fn switch_active(
    ctx: &EncounterContext,
    target: InstanceId,
) -> EncounterResult<Vec<BattleCommand>> {
    let instance = ctx
        .instance(target)
        .ok_or_else(|| EncounterError::not_found(format!("creature {}", target)))?;

    if !instance.on_team {
        return Err(EncounterError::invalid(format!(
            "{} is in the reserve, add it to the team first",
            instance.species
        )));
    }
    if instance.is_fainted() {
        return Err(EncounterError::invalid(format!(
            "{} has fainted and cannot fight",
            instance.species
        )));
    }
    if ctx.battle.active_instance == Some(target) {
        return Err(EncounterError::invalid(format!(
            "{} is already fighting",
            instance.species
        )));
    }

    Ok(vec![BattleCommand::SetActive {
        instance: target,
        forced: false,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::{BattleDraft, BattleStatus};
    use crate::errors::ErrorKind;
    use crate::pokemon::NewInstance;
    use crate::repository::InMemoryRepository;

    const OWNER: UserId = UserId(1);

    fn seed(repo: &InMemoryRepository, team: usize, reserve: usize) -> Vec<CreatureInstance> {
        (0..team + reserve)
            .map(|i| {
                repo.insert_instance(NewInstance {
                    owner: OWNER,
                    species: format!("species-{}", i),
                    current_hp: 20,
                    level: 5,
                    on_team: i < team,
                })
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_toggle_respects_team_capacity() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 6, 1);
        let manager = TeamManager::new(&repo, &config);

        let err = manager.toggle_membership(OWNER, created[6].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);

        let moved = manager.toggle_membership(OWNER, created[0].id).unwrap();
        assert!(!moved.on_team);
        let roster = manager.roster(OWNER).unwrap();
        assert_eq!(roster.team.len(), 5);
        assert_eq!(roster.reserve.len(), 2);
    }

    #[test]
    fn test_toggle_respects_reserve_capacity() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 1, 10);
        let manager = TeamManager::new(&repo, &config);

        let err = manager.toggle_membership(OWNER, created[0].id).unwrap_err();
        assert!(matches!(
            err,
            EncounterError::ResourceExhausted(Resource::ReserveSlots)
        ));
    }

    #[test]
    fn test_swap_keeps_sizes() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 6, 10);
        let manager = TeamManager::new(&repo, &config);

        let (out, incoming) = manager.swap(OWNER, created[2].id, created[9].id).unwrap();
        assert!(!out.on_team);
        assert!(incoming.on_team);

        let roster = manager.roster(OWNER).unwrap();
        assert_eq!(roster.team.len(), 6);
        assert_eq!(roster.reserve.len(), 10);
    }

    #[test]
    fn test_swap_requires_expected_membership() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 2, 2);
        let manager = TeamManager::new(&repo, &config);

        let err = manager.swap(OWNER, created[2].id, created[3].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = manager.swap(UserId(2), created[0].id, created[3].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_release_is_permanent() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 2, 0);
        let manager = TeamManager::new(&repo, &config);

        manager.release(OWNER, created[1].id).unwrap();
        assert_eq!(manager.roster(OWNER).unwrap().len(), 1);
        let err = manager.release(OWNER, created[1].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_fighting_creature_stays_on_team() {
        let repo = InMemoryRepository::new();
        let config = EncounterConfig::default();
        let created = seed(&repo, 2, 1);
        let mut battle = repo
            .insert_battle(BattleDraft::new(OWNER, "pidgey", 40, Some(created[0].id), &config))
            .unwrap();
        let manager = TeamManager::new(&repo, &config);

        let err = manager.toggle_membership(OWNER, created[0].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
        let err = manager.swap(OWNER, created[0].id, created[2].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
        let err = manager.release(OWNER, created[0].id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);

        let roster = manager.roster(OWNER).unwrap();
        assert_eq!(roster.team.len(), 2);
        assert_eq!(roster.reserve.len(), 1);

        // Benched team members are free to move.
        assert!(!manager.toggle_membership(OWNER, created[1].id).unwrap().on_team);

        battle.status = BattleStatus::Won;
        repo.save_battle(&battle).unwrap();
        manager.release(OWNER, created[0].id).unwrap();
        assert_eq!(manager.roster(OWNER).unwrap().len(), 2);
    }
}
