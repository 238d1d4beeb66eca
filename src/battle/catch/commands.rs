use crate::battle::catch::{can_attempt_capture, roll_capture_odds, roll_capture_success, CaptureError};
use crate::battle::commands::BattleCommand;
use crate::battle::context::EncounterContext;
use crate::battle::state::{BattleEvent, BattleStatus, CaptureResult, TurnRng};
use crate::config::EncounterConfig;
use crate::pokemon::NewInstance;

/// Calculate commands for a capture attempt
/// This follows the Command-Execution pattern by returning commands to be executed
///
/// Validation happens before any roll, so a rejected attempt consumes nothing.
/// The attempt counter is spent whether or not the capture holds.
pub fn calculate_capture_commands(
    ctx: &EncounterContext,
    config: &EncounterConfig,
    rng: &mut TurnRng,
) -> Result<Vec<BattleCommand>, CaptureError> {
    can_attempt_capture(ctx, config)?;

    let battle = &ctx.battle;
    let species = battle.wild_species.clone();
    let mut commands = vec![BattleCommand::SpendCapture];

    let odds = roll_capture_odds(battle.wild_current_hp, battle.wild_max_hp, rng);
    commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureAttempted {
        species: species.clone(),
        odds,
        captures_remaining: battle.captures_remaining.saturating_sub(1),
    }));

    if !roll_capture_success(&odds, rng) {
        commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureFailed { species }));
        return Ok(commands);
    }

    match ctx.owned_species(&species) {
        Some(existing) => {
            commands.push(BattleCommand::EmitEvent(BattleEvent::CaptureSucceeded {
                species,
                result: CaptureResult::AlreadyOwned { existing },
            }));
        }
        None => {
            // Note: BattleEvent::CaptureSucceeded is emitted when the command executes
            commands.push(BattleCommand::StoreCapture(NewInstance {
                owner: battle.owner,
                species,
                current_hp: battle.wild_max_hp,
                level: config.captured_level,
                on_team: false,
            }));
        }
    }
    commands.push(BattleCommand::SetStatus(BattleStatus::Captured));

    Ok(commands)
}
