use crate::battle::calculators::{compute_damage, DamageOutcome};
use crate::battle::catch::calculate_capture_commands;
use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::context::EncounterContext;
use crate::battle::state::{
    Battle, BattleEvent, BattleStatus, CaptureResult, EventBus, Side, TurnRng,
};
use crate::catalog::ReferenceBook;
use crate::config::EncounterConfig;
use crate::errors::{EncounterError, EncounterResult, Resource};
use crate::player::PlayerAction;
use crate::pokemon::{CreatureInstance, InstanceId};
use crate::species::Species;
use crate::teams::switch_active;
use serde::{Deserialize, Serialize};

/// Everything the caller learns from one resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub battle: Battle,
    pub events: Vec<BattleEvent>,
    /// Creature stored by a successful capture.
    pub captured: Option<CreatureInstance>,
}

impl ActionOutcome {
    pub fn status(&self) -> BattleStatus {
        self.battle.status
    }

    /// Damage the player's attack dealt to the wild creature.
    pub fn player_attack(&self) -> Option<&DamageOutcome> {
        self.damage_to(Side::Wild)
    }

    /// Damage the wild creature's counter-attack dealt, if it got one.
    pub fn counter_attack(&self) -> Option<&DamageOutcome> {
        self.damage_to(Side::Player)
    }

    /// True if the player's creature fainted during this action.
    pub fn fainted(&self) -> bool {
        self.events.iter().any(|e| {
            matches!(
                e,
                BattleEvent::PokemonFainted {
                    side: Side::Player,
                    ..
                }
            )
        })
    }

    /// The creature sent in automatically after a faint.
    pub fn auto_switched_to(&self) -> Option<InstanceId> {
        self.events.iter().find_map(|e| match e {
            BattleEvent::PokemonSwitched {
                new_instance,
                forced: true,
                ..
            } => Some(*new_instance),
            _ => None,
        })
    }

    /// How a capture attempt ended, if one was made.
    pub fn capture(&self) -> Option<CaptureReport> {
        self.events.iter().find_map(|e| match e {
            BattleEvent::CaptureSucceeded { result, .. } => Some(CaptureReport::Caught(*result)),
            BattleEvent::CaptureFailed { .. } => Some(CaptureReport::BrokeFree),
            _ => None,
        })
    }

    fn damage_to(&self, target: Side) -> Option<&DamageOutcome> {
        self.events.iter().find_map(|e| match e {
            BattleEvent::DamageDealt {
                target: t, outcome, ..
            } if *t == target => Some(outcome),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureReport {
    Caught(CaptureResult),
    BrokeFree,
}

/// Resolve one player action against the battle in `ctx`.
///
/// All preconditions are checked before any roll or mutation. On error the
/// context may be partially updated and must be discarded.
pub fn resolve_action(
    ctx: &mut EncounterContext,
    action: &PlayerAction,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
) -> EncounterResult<EventBus> {
    validate_action(ctx, action)?;

    let mut bus = EventBus::new();
    bus.push(BattleEvent::TurnStarted {
        turn_number: ctx.battle.turn_number,
    });

    match action {
        PlayerAction::Attack { move_name } => {
            resolve_attack(ctx, move_name, book, config, rng, &mut bus)?
        }
        PlayerAction::Capture => resolve_capture(ctx, book, config, rng, &mut bus)?,
        PlayerAction::Heal => resolve_heal(ctx, book, config, rng, &mut bus)?,
        PlayerAction::Flee => resolve_flee(ctx, &mut bus)?,
        PlayerAction::Switch { instance_id } => {
            resolve_switch(ctx, *instance_id, book, config, rng, &mut bus)?
        }
    }

    execute_command_batch(vec![BattleCommand::IncrementTurnNumber], ctx, &mut bus)?;
    Ok(bus)
}

/// Preconditions shared by every action.
pub fn validate_action(ctx: &EncounterContext, action: &PlayerAction) -> EncounterResult<()> {
    if ctx.battle.status.is_terminal() {
        return Err(EncounterError::BattleAlreadyEnded(ctx.battle.id));
    }

    // Switching is how a player recovers from a fainted active creature.
    if matches!(action, PlayerAction::Switch { .. }) {
        return Ok(());
    }

    match ctx.active() {
        Some(active) if active.is_alive() => Ok(()),
        Some(active) => Err(EncounterError::invalid(format!(
            "{} has fainted, switch to another creature first",
            active.species
        ))),
        None => Err(EncounterError::invalid(
            "no active creature, switch to one first",
        )),
    }
}

fn active_species<'a>(
    ctx: &EncounterContext,
    book: &'a ReferenceBook,
) -> EncounterResult<&'a Species> {
    let active = ctx
        .active()
        .ok_or_else(|| EncounterError::invalid("no active creature"))?;
    Ok(book.require_species(&active.species)?.as_ref())
}

fn resolve_attack(
    ctx: &mut EncounterContext,
    move_name: &str,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    let attacker = active_species(ctx, book)?;
    let defender = book.require_species(&ctx.battle.wild_species)?;

    let move_used = match attacker.known_move(move_name) {
        Some(move_used) => move_used,
        None if book.move_data(move_name).is_some() => {
            return Err(EncounterError::MoveNotOwned {
                species: attacker.name.clone(),
                move_name: move_name.to_string(),
            })
        }
        None => return Err(EncounterError::not_found(format!("move '{}'", move_name))),
    };

    let outcome = compute_damage(move_used, attacker, defender, book.types(), rng)?;
    execute_command_batch(
        vec![
            BattleCommand::EmitEvent(BattleEvent::MoveUsed {
                side: Side::Player,
                species: attacker.name.clone(),
                move_name: move_used.name.clone(),
            }),
            BattleCommand::DealDamage {
                target: Side::Wild,
                outcome,
            },
        ],
        ctx,
        bus,
    )?;

    if ctx.battle.wild_current_hp == 0 {
        execute_command_batch(vec![BattleCommand::SetStatus(BattleStatus::Won)], ctx, bus)?;
        return Ok(());
    }

    wild_counter_attack(ctx, book, config, rng, bus)
}

fn resolve_capture(
    ctx: &mut EncounterContext,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    let commands = calculate_capture_commands(ctx, config, rng)?;
    execute_command_batch(commands, ctx, bus)?;

    if ctx.battle.status == BattleStatus::Captured {
        return Ok(());
    }

    wild_counter_attack(ctx, book, config, rng, bus)
}

fn resolve_heal(
    ctx: &mut EncounterContext,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    if ctx.battle.heals_remaining == 0 {
        return Err(EncounterError::ResourceExhausted(Resource::Heals));
    }
    let max_hp = active_species(ctx, book)?.max_hp();

    execute_command_batch(
        vec![
            BattleCommand::SpendHeal,
            BattleCommand::HealActive {
                amount: config.battle_heal_amount,
                max_hp,
            },
        ],
        ctx,
        bus,
    )?;

    wild_counter_attack(ctx, book, config, rng, bus)
}

fn resolve_flee(ctx: &mut EncounterContext, bus: &mut EventBus) -> EncounterResult<()> {
    let species = ctx.battle.wild_species.clone();
    execute_command_batch(
        vec![
            BattleCommand::EmitEvent(BattleEvent::PlayerFled { species }),
            BattleCommand::SetStatus(BattleStatus::Fled),
        ],
        ctx,
        bus,
    )?;
    Ok(())
}

fn resolve_switch(
    ctx: &mut EncounterContext,
    target: InstanceId,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    let commands = switch_active(ctx, target)?;
    execute_command_batch(commands, ctx, bus)?;

    wild_counter_attack(ctx, book, config, rng, bus)
}

/// The wild creature strikes the active creature once.
///
/// It picks uniformly among its known moves, or lands a fixed blow when it
/// knows none. A knockout triggers the faint handling.
fn wild_counter_attack(
    ctx: &mut EncounterContext,
    book: &ReferenceBook,
    config: &EncounterConfig,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    let wild = book.require_species(&ctx.battle.wild_species)?;
    let defender = active_species(ctx, book)?;

    let mut commands = Vec::new();
    let outcome = if wild.moves.is_empty() {
        commands.push(BattleCommand::EmitEvent(BattleEvent::FallbackStrike {
            species: wild.name.clone(),
        }));
        DamageOutcome::fixed(config.fallback_counter_damage)
    } else {
        let index = rng.pick_index(wild.moves.len(), "wild move choice");
        let move_used = &wild.moves[index];
        commands.push(BattleCommand::EmitEvent(BattleEvent::MoveUsed {
            side: Side::Wild,
            species: wild.name.clone(),
            move_name: move_used.name.clone(),
        }));
        compute_damage(move_used, wild, defender, book.types(), rng)?
    };
    commands.push(BattleCommand::DealDamage {
        target: Side::Player,
        outcome,
    });
    execute_command_batch(commands, ctx, bus)?;

    let fainted = ctx.active().filter(|p| p.is_fainted()).map(|p| p.id);
    match fainted {
        Some(fainted) => handle_player_faint(ctx, fainted, bus),
        None => Ok(()),
    }
}

/// Send in the first living team member, or lose the battle if there is none.
fn handle_player_faint(
    ctx: &mut EncounterContext,
    fainted: InstanceId,
    bus: &mut EventBus,
) -> EncounterResult<()> {
    let command = match ctx.next_auto_switch(fainted) {
        Some(instance) => BattleCommand::SetActive {
            instance,
            forced: true,
        },
        None => BattleCommand::SetStatus(BattleStatus::Lost),
    };
    execute_command_batch(vec![command], ctx, bus)?;
    Ok(())
}
