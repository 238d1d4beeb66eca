use crate::battle::effectiveness::TypeEffectivenessTable;
use crate::battle::state::TurnRng;
use crate::errors::{EncounterError, EncounterResult};
use crate::species::{MoveData, Species};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Fixed level used by the damage formula; instance levels do not scale damage.
pub const REFERENCE_LEVEL: f64 = 50.0;

pub const VARIANCE_MIN: f64 = 0.85;
pub const VARIANCE_MAX: f64 = 1.0;

/// Classification of a type multiplier for battle messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Effectiveness {
    #[strum(serialize = "no-damage move")]
    NoDamage,
    #[strum(serialize = "no effect")]
    NoEffect,
    #[strum(serialize = "not very effective")]
    NotVeryEffective,
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "effective")]
    Effective,
    #[strum(serialize = "super effective")]
    SuperEffective,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier == 0.0 {
            Effectiveness::NoEffect
        } else if multiplier <= 0.5 {
            Effectiveness::NotVeryEffective
        } else if multiplier <= 1.0 {
            Effectiveness::Normal
        } else if multiplier < 2.0 {
            Effectiveness::Effective
        } else {
            Effectiveness::SuperEffective
        }
    }
}

/// Result of resolving one damaging (or non-damaging) move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub damage: u16,
    pub multiplier: OrderedFloat<f64>,
    pub effectiveness: Effectiveness,
}

impl DamageOutcome {
    pub fn no_damage() -> Self {
        Self {
            damage: 0,
            multiplier: OrderedFloat(1.0),
            effectiveness: Effectiveness::NoDamage,
        }
    }

    /// Flat damage with no type interaction.
    pub fn fixed(damage: u16) -> Self {
        Self {
            damage,
            multiplier: OrderedFloat(1.0),
            effectiveness: Effectiveness::Normal,
        }
    }
}

/// Damage before type multiplier and variance:
/// `((2 * L / 5 + 2) * power * attack / defense) / 50 + 2` with `L` the reference level.
pub fn base_damage(power: u16, attack: u16, defense: u16) -> f64 {
    let level_factor = 2.0 * REFERENCE_LEVEL / 5.0 + 2.0;
    let defense = f64::from(defense.max(1));
    (level_factor * f64::from(power) * f64::from(attack) / defense) / 50.0 + 2.0
}

/// Resolve `move_used` against the defender.
///
/// The move must belong to the attacker's known moves. A move without power
/// deals nothing and consumes no roll; any other move consumes exactly one
/// variance roll and always deals at least 1.
pub fn compute_damage(
    move_used: &MoveData,
    attacker: &Species,
    defender: &Species,
    table: &TypeEffectivenessTable,
    rng: &mut TurnRng,
) -> EncounterResult<DamageOutcome> {
    if !attacker.knows_move(&move_used.name) {
        return Err(EncounterError::MoveNotOwned {
            species: attacker.name.clone(),
            move_name: move_used.name.clone(),
        });
    }

    let Some(power) = move_used.power else {
        return Ok(DamageOutcome::no_damage());
    };

    let multiplier = table.combined_multiplier(&move_used.move_type, &defender.types);
    let variance = rng.uniform(VARIANCE_MIN, VARIANCE_MAX, "damage variance");
    let raw = base_damage(power, attacker.attack(), defender.defense()) * multiplier * variance;
    let damage = raw.floor().max(1.0) as u16;

    Ok(DamageOutcome {
        damage,
        multiplier: OrderedFloat(multiplier),
        effectiveness: Effectiveness::from_multiplier(multiplier),
    })
}
