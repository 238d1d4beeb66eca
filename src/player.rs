use crate::errors::{EncounterError, EncounterResult};
use crate::pokemon::{CreatureInstance, InstanceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// What the player does on their turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PlayerAction {
    Attack { move_name: String },
    Capture,
    Heal,
    Flee,
    Switch { instance_id: InstanceId },
}

/// Tag of a `PlayerAction`, as accepted at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActionKind {
    Attack,
    Capture,
    Heal,
    Flee,
    Switch,
}

impl PlayerAction {
    /// Build an action from a free-form tag and its parameters.
    ///
    /// `attack` needs a string `move_name` (or `move`), `switch` needs an
    /// integer `instance_id`; the other actions ignore `params`.
    pub fn from_tag(tag: &str, params: &serde_json::Value) -> EncounterResult<Self> {
        let kind = ActionKind::from_str(tag.trim())
            .map_err(|_| EncounterError::invalid(format!("unknown action '{}'", tag)))?;

        match kind {
            ActionKind::Attack => {
                let move_name = params
                    .get("move_name")
                    .or_else(|| params.get("move"))
                    .and_then(|v| v.as_str())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| EncounterError::invalid("attack requires a move_name"))?;
                Ok(PlayerAction::Attack {
                    move_name: move_name.to_lowercase(),
                })
            }
            ActionKind::Capture => Ok(PlayerAction::Capture),
            ActionKind::Heal => Ok(PlayerAction::Heal),
            ActionKind::Flee => Ok(PlayerAction::Flee),
            ActionKind::Switch => {
                let id = params
                    .get("instance_id")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| EncounterError::invalid("switch requires an instance_id"))?;
                Ok(PlayerAction::Switch {
                    instance_id: InstanceId(id),
                })
            }
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            PlayerAction::Attack { .. } => ActionKind::Attack,
            PlayerAction::Capture => ActionKind::Capture,
            PlayerAction::Heal => ActionKind::Heal,
            PlayerAction::Flee => ActionKind::Flee,
            PlayerAction::Switch { .. } => ActionKind::Switch,
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Attack { move_name } => write!(f, "attack with {}", move_name),
            PlayerAction::Switch { instance_id } => write!(f, "switch to {}", instance_id),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A player's creatures split by team membership, each half sorted by id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub team: Vec<CreatureInstance>,
    pub reserve: Vec<CreatureInstance>,
}

impl Roster {
    pub fn from_instances(mut instances: Vec<CreatureInstance>) -> Self {
        instances.sort_by_key(|p| p.id);
        let (team, reserve) = instances.into_iter().partition(|p| p.on_team);
        Self { team, reserve }
    }

    pub fn len(&self) -> usize {
        self.team.len() + self.reserve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.team.is_empty() && self.reserve.is_empty()
    }

    pub fn has_living_team_member(&self) -> bool {
        self.team.iter().any(|p| p.is_alive())
    }
}
