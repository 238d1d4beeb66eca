use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    /// `None` for moves that deal no direct damage.
    pub power: Option<u16>,
    pub pp: u8,
    pub accuracy: Option<u8>,
    pub move_type: String,
}

impl MoveData {
    pub fn deals_damage(&self) -> bool {
        self.power.is_some()
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = self
            .power
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let accuracy = self
            .accuracy
            .map(|a| format!("{}%", a))
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} [{}] Power: {} | Accuracy: {} | PP: {}",
            self.name, self.move_type, power, accuracy, self.pp
        )
    }
}
