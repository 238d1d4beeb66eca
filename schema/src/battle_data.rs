use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a battle. Everything but `Active` is terminal.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    Active,
    Won,
    Lost,
    Fled,
    Captured,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BattleStatus::Active)
    }
}
