use crate::auth::UserId;
use crate::battle::calculators::{DamageOutcome, Effectiveness};
use crate::battle::catch::CaptureOdds;
use crate::config::EncounterConfig;
use crate::pokemon::InstanceId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use schema::BattleStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BattleId(pub u64);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Wild,
}

/// One encounter between a player and a single wild creature.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    pub id: BattleId,
    pub owner: UserId,
    pub wild_species: String,
    pub wild_max_hp: u16,
    pub wild_current_hp: u16,
    pub status: BattleStatus,
    pub captures_remaining: u8,
    pub heals_remaining: u8,
    /// The player's creature currently fighting.
    pub active_instance: Option<InstanceId>,
    pub turn_number: u32,
}

/// A battle not yet stored; the repository assigns the id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattleDraft {
    pub owner: UserId,
    pub wild_species: String,
    pub wild_max_hp: u16,
    pub active_instance: Option<InstanceId>,
    pub captures_remaining: u8,
    pub heals_remaining: u8,
}

impl BattleDraft {
    pub fn new(
        owner: UserId,
        wild_species: &str,
        wild_max_hp: u16,
        active_instance: Option<InstanceId>,
        config: &EncounterConfig,
    ) -> Self {
        Self {
            owner,
            wild_species: wild_species.to_string(),
            wild_max_hp,
            active_instance,
            captures_remaining: config.captures_per_battle,
            heals_remaining: config.heals_per_battle,
        }
    }

    pub fn into_battle(self, id: BattleId) -> Battle {
        Battle {
            id,
            owner: self.owner,
            wild_species: self.wild_species,
            wild_max_hp: self.wild_max_hp,
            wild_current_hp: self.wild_max_hp,
            status: BattleStatus::Active,
            captures_remaining: self.captures_remaining,
            heals_remaining: self.heals_remaining,
            active_instance: self.active_instance,
            turn_number: 1,
        }
    }
}

impl Battle {
    pub fn is_active(&self) -> bool {
        self.status == BattleStatus::Active
    }

    pub fn wild_hp_percent(&self) -> f64 {
        if self.wild_max_hp == 0 {
            return 0.0;
        }
        f64::from(self.wild_current_hp) / f64::from(self.wild_max_hp) * 100.0
    }
}

/// Whether a capture produced a new creature or hit a species already owned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureResult {
    Stored,
    AlreadyOwned { existing: InstanceId },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    TurnStarted {
        turn_number: u32,
    },

    MoveUsed {
        side: Side,
        species: String,
        move_name: String,
    },
    /// The wild creature knows no moves and strikes with a fixed blow.
    FallbackStrike {
        species: String,
    },
    DamageDealt {
        target: Side,
        species: String,
        outcome: DamageOutcome,
        remaining_hp: u16,
    },
    PokemonHealed {
        instance: InstanceId,
        species: String,
        amount: u16,
        new_hp: u16,
    },
    PokemonFainted {
        side: Side,
        species: String,
    },
    PokemonSwitched {
        old_instance: Option<InstanceId>,
        new_instance: InstanceId,
        species: String,
        forced: bool,
    },

    CaptureAttempted {
        species: String,
        odds: CaptureOdds,
        captures_remaining: u8,
    },
    CaptureSucceeded {
        species: String,
        result: CaptureResult,
    },
    CaptureFailed {
        species: String,
    },

    PlayerFled {
        species: String,
    },
    BattleEnded {
        status: BattleStatus,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }

            BattleEvent::MoveUsed {
                side,
                species,
                move_name,
            } => {
                let prefix = match side {
                    Side::Player => "Your",
                    Side::Wild => "The wild",
                };
                Some(format!(
                    "{} {} used {}!",
                    prefix,
                    display_name(species),
                    display_name(move_name)
                ))
            }
            BattleEvent::FallbackStrike { species } => Some(format!(
                "The wild {} lashes out!",
                display_name(species)
            )),
            BattleEvent::DamageDealt {
                species, outcome, ..
            } => {
                let mut text = format!(
                    "{} took {} damage!",
                    display_name(species),
                    outcome.damage
                );
                match outcome.effectiveness {
                    Effectiveness::SuperEffective | Effectiveness::Effective => {
                        text.push_str(" It's super effective!")
                    }
                    Effectiveness::NotVeryEffective => {
                        text.push_str(" It's not very effective...")
                    }
                    Effectiveness::NoEffect => text.push_str(" It barely had an effect..."),
                    Effectiveness::Normal | Effectiveness::NoDamage => {}
                }
                Some(text)
            }
            BattleEvent::PokemonHealed {
                species, amount, ..
            } => Some(format!(
                "{} recovered {} HP!",
                display_name(species),
                amount
            )),
            BattleEvent::PokemonFainted { side, species } => match side {
                Side::Player => Some(format!("Your {} fainted!", display_name(species))),
                Side::Wild => Some(format!("The wild {} fainted!", display_name(species))),
            },
            BattleEvent::PokemonSwitched {
                species, forced, ..
            } => {
                if *forced {
                    Some(format!("{} jumps in to fight!", display_name(species)))
                } else {
                    Some(format!("Go, {}!", display_name(species)))
                }
            }

            BattleEvent::CaptureAttempted { .. } => {
                None // Silent - odds are not shown to the player
            }
            BattleEvent::CaptureSucceeded { species, result } => match result {
                CaptureResult::Stored => {
                    Some(format!("Gotcha! {} was caught!", display_name(species)))
                }
                CaptureResult::AlreadyOwned { .. } => Some(format!(
                    "{} was caught, but you already have one.",
                    display_name(species)
                )),
            },
            BattleEvent::CaptureFailed { species } => Some(format!(
                "Oh no! The wild {} broke free!",
                display_name(species)
            )),

            BattleEvent::PlayerFled { .. } => Some("Got away safely!".to_string()),
            BattleEvent::BattleEnded { status } => Some(format!("Battle over: {}", status)),
        }
    }
}

/// Capitalise a lowercase catalog name for display, e.g. "vine-whip" -> "Vine-whip".
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered log of everything that happened while resolving an action.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Formatted text of every non-silent event.
    pub fn formatted_lines(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    /// Emit every event at debug level under the given battle.
    pub fn trace(&self, battle_id: BattleId) {
        for event in &self.events {
            tracing::debug!(battle = %battle_id, ?event, "battle event");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Source of the unit rolls consumed while resolving one action.
///
/// Tests script the exact sequence of rolls; live battles draw from a
/// seedable generator.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

#[derive(Debug, Clone)]
enum RngSource {
    Scripted { outcomes: Vec<f64>, index: usize },
    Seeded(StdRng),
}

impl TurnRng {
    /// Each outcome is a unit roll in `[0, 1]`.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    pub fn from_config(config: &EncounterConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new_random(),
        }
    }

    pub fn next_unit(&mut self, reason: &str) -> f64 {
        match &mut self.source {
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index].clamp(0.0, 1.0);

                #[cfg(test)]
                println!("[RNG] Consumed {} for: {}", outcome, reason);

                *index += 1;
                outcome
            }
            RngSource::Seeded(rng) => rng.random::<f64>(),
        }
    }

    /// Uniform value in `[lo, hi]`. A unit roll of 0 yields `lo`, 1 yields `hi`.
    pub fn uniform(&mut self, lo: f64, hi: f64, reason: &str) -> f64 {
        let u = self.next_unit(reason);
        lo * (1.0 - u) + hi * u
    }

    /// Index in `0..len`. `len` must be positive.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        let u = self.next_unit(reason);
        ((u * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Number of scripted rolls not yet consumed; always zero for seeded sources.
    pub fn remaining(&self) -> usize {
        match &self.source {
            RngSource::Scripted { outcomes, index } => outcomes.len().saturating_sub(*index),
            RngSource::Seeded(_) => 0,
        }
    }
}
