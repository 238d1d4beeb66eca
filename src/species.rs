use serde::{Deserialize, Serialize};
use std::fmt;

pub use schema::{BaseStats, MoveData, SpeciesData, Sprites};

/// A species resolved from the catalog, with its known moves fully loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub base_stats: BaseStats,
    pub types: Vec<String>,
    pub base_experience: u16,
    pub height: u16,
    pub weight: u16,
    pub sprites: Sprites,
    pub moves: Vec<MoveData>,
}

impl Species {
    /// Upper bound on the known-move set kept per species.
    pub const MAX_MOVES: usize = 4;

    /// Build from catalog data and the resolved details of its moves.
    /// Only the first four moves are kept.
    pub fn from_data(data: SpeciesData, mut moves: Vec<MoveData>) -> Self {
        moves.truncate(Self::MAX_MOVES);
        Self {
            name: data.name.to_lowercase(),
            base_stats: data.base_stats,
            types: data.types.iter().map(|t| t.to_lowercase()).collect(),
            base_experience: data.base_experience,
            height: data.height,
            weight: data.weight,
            sprites: data.sprites,
            moves,
        }
    }

    pub fn max_hp(&self) -> u16 {
        self.base_stats.hp
    }

    pub fn attack(&self) -> u16 {
        self.base_stats.attack
    }

    pub fn defense(&self) -> u16 {
        self.base_stats.defense
    }

    pub fn known_move(&self, move_name: &str) -> Option<&MoveData> {
        self.moves
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(move_name))
    }

    pub fn knows_move(&self, move_name: &str) -> bool {
        self.known_move(move_name).is_some()
    }

    pub fn move_names(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.name.as_str()).collect()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "--------------------")?;
        writeln!(f, "Type(s): {}", self.types.join(" / "))?;

        const LABEL_WIDTH: usize = 12;
        let stats = &self.base_stats;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "HP", stats.hp)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Attack", stats.attack)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Defense", stats.defense)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Sp. Atk", stats.sp_attack)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Sp. Def", stats.sp_defense)?;
        writeln!(f, "{:<LABEL_WIDTH$} : {}", "Speed", stats.speed)?;

        if self.moves.is_empty() {
            write!(f, "Moves: (none)")
        } else {
            write!(f, "Moves: {}", self.move_names().join(", "))
        }
    }
}
