use crate::auth::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A creature owned by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureInstance {
    pub id: InstanceId,
    pub owner: UserId,
    pub species: String,
    pub current_hp: u16,
    pub level: u8,
    pub experience: u32,
    pub on_team: bool,
}

/// Fields of a creature not yet stored; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstance {
    pub owner: UserId,
    pub species: String,
    pub current_hp: u16,
    pub level: u8,
    pub on_team: bool,
}

impl NewInstance {
    pub fn into_instance(self, id: InstanceId) -> CreatureInstance {
        CreatureInstance {
            id,
            owner: self.owner,
            species: self.species,
            current_hp: self.current_hp,
            level: self.level,
            experience: 0,
            on_team: self.on_team,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthCondition {
    Healthy,
    Injured,
    Fainted,
}

impl CreatureInstance {
    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_fainted()
    }

    /// Apply damage, clamping at zero. Returns true if this knocked the creature out.
    pub fn take_damage(&mut self, amount: u16) -> bool {
        let was_alive = self.is_alive();
        self.current_hp = self.current_hp.saturating_sub(amount);
        was_alive && self.is_fainted()
    }

    /// Restore up to `amount` HP without exceeding `max_hp`. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u16, max_hp: u16) -> u16 {
        let old_hp = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(max_hp);
        self.current_hp.saturating_sub(old_hp)
    }

    pub fn restore_full(&mut self, max_hp: u16) {
        self.current_hp = max_hp;
    }

    /// Bring a fainted creature back at half its maximum HP.
    pub fn revive(&mut self, max_hp: u16) -> bool {
        if !self.is_fainted() {
            return false;
        }
        self.current_hp = max_hp / 2;
        true
    }

    pub fn condition(&self, max_hp: u16) -> HealthCondition {
        if self.is_fainted() {
            HealthCondition::Fainted
        } else if self.current_hp < max_hp {
            HealthCondition::Injured
        } else {
            HealthCondition::Healthy
        }
    }
}

impl fmt::Display for CreatureInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (Lv. {}, HP {})",
            self.id, self.species, self.level, self.current_hp
        )
    }
}
