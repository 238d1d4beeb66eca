use crate::battle::state::Battle;
use crate::pokemon::{CreatureInstance, InstanceId, NewInstance};

/// Working copy of everything one action may change.
///
/// The engine mutates the context freely; the service persists it only when
/// the action succeeds, so a rejected action leaves storage untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterContext {
    pub battle: Battle,
    /// Every creature the battle's owner holds, sorted by id.
    pub roster: Vec<CreatureInstance>,
    pub new_capture: Option<NewInstance>,
}

impl EncounterContext {
    pub fn new(battle: Battle, mut roster: Vec<CreatureInstance>) -> Self {
        roster.sort_by_key(|p| p.id);
        Self {
            battle,
            roster,
            new_capture: None,
        }
    }

    pub fn instance(&self, id: InstanceId) -> Option<&CreatureInstance> {
        self.roster.iter().find(|p| p.id == id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut CreatureInstance> {
        self.roster.iter_mut().find(|p| p.id == id)
    }

    pub fn active(&self) -> Option<&CreatureInstance> {
        self.battle.active_instance.and_then(|id| self.instance(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut CreatureInstance> {
        let id = self.battle.active_instance?;
        self.instance_mut(id)
    }

    /// The creature of this species the owner already holds, if any.
    pub fn owned_species(&self, species: &str) -> Option<InstanceId> {
        self.roster
            .iter()
            .find(|p| p.species.eq_ignore_ascii_case(species))
            .map(|p| p.id)
    }

    pub fn team_count(&self) -> usize {
        self.roster.iter().filter(|p| p.on_team).count()
    }

    pub fn reserve_count(&self) -> usize {
        self.roster.iter().filter(|p| !p.on_team).count()
    }

    /// First living team member other than `fainted`, by ascending id.
    pub fn next_auto_switch(&self, fainted: InstanceId) -> Option<InstanceId> {
        self.roster
            .iter()
            .find(|p| p.on_team && p.is_alive() && p.id != fainted)
            .map(|p| p.id)
    }
}
