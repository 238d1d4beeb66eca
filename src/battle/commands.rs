use crate::battle::calculators::DamageOutcome;
use crate::battle::context::EncounterContext;
use crate::battle::state::{BattleEvent, BattleStatus, CaptureResult, EventBus, Side};
use crate::errors::{EncounterError, Resource};
use crate::pokemon::{InstanceId, NewInstance};
use thiserror::Error;

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    SetStatus(BattleStatus),
    IncrementTurnNumber,

    DealDamage {
        target: Side,
        outcome: DamageOutcome,
    },
    /// Heal the active creature, never above `max_hp`.
    HealActive {
        amount: u16,
        max_hp: u16,
    },
    SetActive {
        instance: InstanceId,
        forced: bool,
    },

    SpendCapture,
    SpendHeal,
    StoreCapture(NewInstance),

    EmitEvent(BattleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no active creature")]
    NoActiveCreature,
    #[error("creature {0} is not in the roster")]
    UnknownInstance(InstanceId),
    #[error("no {0} left to spend")]
    CounterUnderflow(Resource),
}

impl From<ExecutionError> for EncounterError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::CounterUnderflow(resource) => EncounterError::ResourceExhausted(resource),
            other => EncounterError::InvalidAction(other.to_string()),
        }
    }
}

pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    ctx: &mut EncounterContext,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    for command in commands {
        execute_command(command, ctx, bus)?;
    }
    Ok(())
}

/// Apply damage to one side, clamping at zero, and report it.
fn execute_deal_damage_command(
    target: Side,
    outcome: DamageOutcome,
    ctx: &mut EncounterContext,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    let (species, remaining_hp, did_faint) = match target {
        Side::Wild => {
            let battle = &mut ctx.battle;
            let was_standing = battle.wild_current_hp > 0;
            battle.wild_current_hp = battle.wild_current_hp.saturating_sub(outcome.damage);
            (
                battle.wild_species.clone(),
                battle.wild_current_hp,
                was_standing && battle.wild_current_hp == 0,
            )
        }
        Side::Player => {
            let pokemon = ctx.active_mut().ok_or(ExecutionError::NoActiveCreature)?;
            let did_faint = pokemon.take_damage(outcome.damage);
            (pokemon.species.clone(), pokemon.current_hp, did_faint)
        }
    };

    bus.push(BattleEvent::DamageDealt {
        target,
        species: species.clone(),
        outcome,
        remaining_hp,
    });

    if did_faint {
        bus.push(BattleEvent::PokemonFainted {
            side: target,
            species,
        });
    }

    Ok(())
}

fn execute_command(
    command: BattleCommand,
    ctx: &mut EncounterContext,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
            Ok(())
        }
        BattleCommand::SetStatus(status) => {
            ctx.battle.status = status;
            if status.is_terminal() {
                bus.push(BattleEvent::BattleEnded { status });
            }
            Ok(())
        }
        BattleCommand::IncrementTurnNumber => {
            ctx.battle.turn_number += 1;
            Ok(())
        }
        BattleCommand::DealDamage { target, outcome } => {
            execute_deal_damage_command(target, outcome, ctx, bus)
        }
        BattleCommand::HealActive { amount, max_hp } => {
            let pokemon = ctx.active_mut().ok_or(ExecutionError::NoActiveCreature)?;
            let healed = pokemon.heal(amount, max_hp);
            bus.push(BattleEvent::PokemonHealed {
                instance: pokemon.id,
                species: pokemon.species.clone(),
                amount: healed,
                new_hp: pokemon.current_hp,
            });
            Ok(())
        }
        BattleCommand::SetActive { instance, forced } => {
            let species = ctx
                .instance(instance)
                .map(|p| p.species.clone())
                .ok_or(ExecutionError::UnknownInstance(instance))?;
            let old_instance = ctx.battle.active_instance.replace(instance);
            bus.push(BattleEvent::PokemonSwitched {
                old_instance,
                new_instance: instance,
                species,
                forced,
            });
            Ok(())
        }
        BattleCommand::SpendCapture => {
            ctx.battle.captures_remaining = ctx
                .battle
                .captures_remaining
                .checked_sub(1)
                .ok_or(ExecutionError::CounterUnderflow(Resource::Captures))?;
            Ok(())
        }
        BattleCommand::SpendHeal => {
            ctx.battle.heals_remaining = ctx
                .battle
                .heals_remaining
                .checked_sub(1)
                .ok_or(ExecutionError::CounterUnderflow(Resource::Heals))?;
            Ok(())
        }
        BattleCommand::StoreCapture(new_instance) => {
            bus.push(BattleEvent::CaptureSucceeded {
                species: new_instance.species.clone(),
                result: CaptureResult::Stored,
            });
            ctx.new_capture = Some(new_instance);
            Ok(())
        }
    }
}
