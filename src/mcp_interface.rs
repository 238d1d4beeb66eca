//! Text rendering and command parsing shared by the CLI and the MCP server.
//!
//! Everything here is presentation: the functions take service results and
//! turn them into the lines a player reads, or parse what a player typed.

use std::sync::Arc;

use serde_json::json;

use crate::battle::catch::{base_capture_probability, capture_chance_description};
use crate::battle::engine::{ActionOutcome, CaptureReport};
use crate::battle::state::{display_name, Battle, BattleStatus};
use crate::errors::EncounterResult;
use crate::healing::HealthReport;
use crate::player::{PlayerAction, Roster};
use crate::pokemon::InstanceId;
use crate::species::Species;

/// Returns formatted text listing the starter choices.
pub fn display_starter_options(options: &[Arc<Species>]) -> String {
    let mut output = String::from("Choose your first partner:\n");
    for (i, species) in options.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} ({}) HP {} / Atk {} / Def {}\n",
            i + 1,
            display_name(&species.name),
            species.types.join("/"),
            species.max_hp(),
            species.attack(),
            species.defense()
        ));
    }
    output
}

/// Summary of a battle: the wild creature, remaining items and the state.
pub fn display_battle_status(battle: &Battle) -> String {
    let capture_odds = base_capture_probability(battle.wild_current_hp, battle.wild_max_hp);
    let active = battle
        .active_instance
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        "--- Battle {} (turn {}) ---\nWild {}: HP {}/{}\nCaptures left: {} | Heals left: {}\nCapture chance: {}\nActive creature: {}\nStatus: {}",
        battle.id.0,
        battle.turn_number,
        display_name(&battle.wild_species),
        battle.wild_current_hp,
        battle.wild_max_hp,
        battle.captures_remaining,
        battle.heals_remaining,
        capture_chance_description(capture_odds),
        active,
        battle.status
    )
}

/// Banner line for the state of a battle.
pub fn get_battle_status_summary(battle: &Battle) -> String {
    let banner = match battle.status {
        BattleStatus::Active => "Battle in Progress",
        BattleStatus::Won => "Battle Over - You Won!",
        BattleStatus::Lost => "Battle Over - You Lost!",
        BattleStatus::Fled => "Battle Over - You Fled",
        BattleStatus::Captured => "Battle Over - Creature Captured!",
    };
    format!("{}\n{}", banner, display_battle_status(battle))
}

/// Lists the team and the reserve; `active` marks the creature fighting.
pub fn display_roster(roster: &Roster, active: Option<InstanceId>) -> String {
    let mut output = String::from("--- Your Team ---\n");
    if roster.team.is_empty() {
        output.push_str("  (empty)\n");
    }
    for creature in &roster.team {
        let active_marker = if Some(creature.id) == active {
            " (Active)"
        } else {
            ""
        };
        let fainted_marker = if creature.is_fainted() {
            " (Fainted)"
        } else {
            ""
        };
        output.push_str(&format!("  {}{}{}\n", creature, active_marker, fainted_marker));
    }

    output.push_str("--- Reserve ---\n");
    if roster.reserve.is_empty() {
        output.push_str("  (empty)\n");
    }
    for creature in &roster.reserve {
        output.push_str(&format!("  {}\n", creature));
    }
    output
}

/// Battle log of one action followed by what it means for the player.
pub fn display_outcome(outcome: &ActionOutcome) -> String {
    let mut output = String::new();
    for event in &outcome.events {
        if let Some(line) = event.format() {
            output.push_str(&line);
            output.push('\n');
        }
    }

    if let Some(captured) = &outcome.captured {
        output.push_str(&format!(
            "\n{} was sent to your reserve as {}.\n",
            display_name(&captured.species),
            captured.id
        ));
    }
    if matches!(outcome.capture(), Some(CaptureReport::Caught(_))) && outcome.captured.is_none() {
        output.push_str("\nNothing new was added to your roster.\n");
    }

    match outcome.status() {
        BattleStatus::Won => output.push_str("\nYou won the battle!\n"),
        BattleStatus::Lost => output.push_str("\nAll your team members fainted. You lost!\n"),
        BattleStatus::Fled => output.push_str("\nYou left the battle.\n"),
        BattleStatus::Captured => output.push_str("\nThe encounter is over.\n"),
        BattleStatus::Active => {
            if let Some(id) = outcome.auto_switched_to() {
                output.push_str(&format!("\n{} is now fighting.\n", id));
            }
        }
    }
    output
}

pub fn display_health_report(report: &HealthReport) -> String {
    let mut output = format!(
        "--- Health Report ---\n{} creatures: {} standing ({} injured), {} fainted\n",
        report.total, report.standing, report.injured, report.fainted
    );
    for creature in &report.creatures {
        let place = if creature.on_team { "team" } else { "reserve" };
        output.push_str(&format!(
            "  {} {} HP {}/{} [{}] ({})\n",
            creature.id,
            display_name(&creature.species),
            creature.current_hp,
            creature.max_hp,
            creature.condition,
            place
        ));
    }
    output
}

/// Species details with its known moves.
pub fn handle_lookup_pokemon_command(species: &Species) -> String {
    let mut output = format!("--- Pokemon Details ---\n{}", species);
    if !species.moves.is_empty() {
        output.push_str("--- Moves ---\n");
        for known in &species.moves {
            output.push_str(&format!("  {}\n", known));
        }
    }
    output
}

/// Parse a typed battle command such as `attack ember`, `switch 3` or `flee`.
pub fn parse_action_command(input: &str) -> EncounterResult<PlayerAction> {
    let mut parts = input.split_whitespace();
    let tag = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    let params = match rest.first() {
        Some(arg) => match arg.trim_start_matches('#').parse::<u64>() {
            Ok(id) => json!({ "instance_id": id, "move_name": rest.join(" ") }),
            Err(_) => json!({ "move_name": rest.join("-") }),
        },
        None => json!({}),
    };
    PlayerAction::from_tag(tag, &params)
}
