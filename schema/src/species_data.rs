use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front: Option<String>,
    pub back: Option<String>,
}

/// Species record as returned by the creature catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub base_stats: BaseStats,
    pub types: Vec<String>,
    pub base_experience: u16,
    pub height: u16,
    pub weight: u16,
    #[serde(default)]
    pub sprites: Sprites,
    /// Move pool references (move names). Only the first four are learned.
    #[serde(default)]
    pub moves: Vec<String>,
}
