//! Tunable constants for the encounter engine, loaded from an optional RON file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable pointing to a RON configuration file.
pub const CONFIG_ENV_VAR: &str = "POKEMON_ENCOUNTER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// Capture attempts granted to each new battle.
    #[serde(default = "default_captures_per_battle")]
    pub captures_per_battle: u8,

    /// Healing items granted to each new battle.
    #[serde(default = "default_heals_per_battle")]
    pub heals_per_battle: u8,

    /// HP restored by a single in-battle heal.
    #[serde(default = "default_battle_heal_amount")]
    pub battle_heal_amount: u16,

    #[serde(default = "default_team_capacity")]
    pub team_capacity: usize,

    #[serde(default = "default_reserve_capacity")]
    pub reserve_capacity: usize,

    /// Level given to captured creatures.
    #[serde(default = "default_level")]
    pub captured_level: u8,

    #[serde(default = "default_level")]
    pub starter_level: u8,

    /// Damage dealt by a wild creature that knows no moves.
    #[serde(default = "default_fallback_counter_damage")]
    pub fallback_counter_damage: u16,

    #[serde(default = "default_starter_species")]
    pub starter_species: Vec<String>,

    /// Fixed seed for reproducible sessions; fresh entropy when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_captures_per_battle() -> u8 {
    5
}

fn default_heals_per_battle() -> u8 {
    2
}

fn default_battle_heal_amount() -> u16 {
    50
}

fn default_team_capacity() -> usize {
    6
}

fn default_reserve_capacity() -> usize {
    10
}

fn default_level() -> u8 {
    5
}

fn default_fallback_counter_damage() -> u16 {
    10
}

fn default_starter_species() -> Vec<String> {
    vec![
        "bulbasaur".to_string(),
        "charmander".to_string(),
        "squirtle".to_string(),
    ]
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            captures_per_battle: default_captures_per_battle(),
            heals_per_battle: default_heals_per_battle(),
            battle_heal_amount: default_battle_heal_amount(),
            team_capacity: default_team_capacity(),
            reserve_capacity: default_reserve_capacity(),
            captured_level: default_level(),
            starter_level: default_level(),
            fallback_counter_damage: default_fallback_counter_damage(),
            starter_species: default_starter_species(),
            rng_seed: None,
        }
    }
}

impl EncounterConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EncounterConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from the file named by `POKEMON_ENCOUNTER_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.team_capacity == 0 {
            return Err(ConfigError::Invalid(
                "team_capacity must be at least 1".to_string(),
            ));
        }
        if self.reserve_capacity == 0 {
            return Err(ConfigError::Invalid(
                "reserve_capacity must be at least 1".to_string(),
            ));
        }
        if self.battle_heal_amount == 0 {
            return Err(ConfigError::Invalid(
                "battle_heal_amount must be positive".to_string(),
            ));
        }
        if self.starter_species.is_empty() {
            return Err(ConfigError::Invalid(
                "starter_species must name at least one species".to_string(),
            ));
        }
        if self.captured_level == 0 || self.starter_level == 0 {
            return Err(ConfigError::Invalid("levels start at 1".to_string()));
        }
        Ok(())
    }

    pub fn is_starter(&self, species: &str) -> bool {
        self.starter_species
            .iter()
            .any(|name| name.eq_ignore_ascii_case(species))
    }
}
