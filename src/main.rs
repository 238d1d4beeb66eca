//! Interactive terminal front end over the bundled offline catalog.

use std::sync::Arc;

use pokemon_encounter::battle::state::BattleId;
use pokemon_encounter::mcp_interface::*;
use pokemon_encounter::{
    AuthContext, EncounterConfig, EncounterError, EncounterResult, EncounterService,
    InMemoryRepository, InstanceId, RonCatalog, StaticAuth, UserId,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  starters                 list the starter species
  choose <species>         pick your starter
  battle                   start a wild encounter
  status                   show the current battle
  attack <move>            attack with one of your active creature's moves
  capture | heal | flee    other battle actions
  switch <id>              send in another team member
  team                     list your team and reserve
  toggle <id>              move a creature between team and reserve
  swap <team id> <reserve id>
  release <id>
  center                   restore every creature to full HP
  revive <id> | reviveall  revive fainted creatures at half HP
  report                   health report
  lookup <species>         species details
  help | quit";

struct Session {
    service: EncounterService,
    auth: StaticAuth,
    battle: Option<BattleId>,
}

impl Session {
    fn user(&self) -> UserId {
        self.auth.current_user()
    }

    fn current_battle(&self) -> EncounterResult<BattleId> {
        self.battle
            .ok_or_else(|| EncounterError::invalid("no battle yet, type 'battle' to start one"))
    }

    async fn active_instance(&self) -> Option<InstanceId> {
        let id = self.battle?;
        let battle = self.service.get_battle(self.user(), id).await.ok()?;
        battle.active_instance.filter(|_| battle.is_active())
    }

    async fn handle(&mut self, line: &str) -> EncounterResult<String> {
        let (command, args) = match line.split_once(' ') {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };
        let user = self.user();

        match command.to_lowercase().as_str() {
            "help" => Ok(HELP.to_string()),
            "starters" => Ok(display_starter_options(
                &self.service.starter_options().await?,
            )),
            "choose" => {
                let starter = self.service.choose_starter(user, args).await?;
                Ok(format!("You chose {}!", starter))
            }
            "battle" => {
                let battle = self.service.start_battle(user).await?;
                self.battle = Some(battle.id);
                Ok(format!(
                    "A wild Pokemon appeared!\n{}",
                    get_battle_status_summary(&battle)
                ))
            }
            "status" => {
                let battle = self.service.get_battle(user, self.current_battle()?).await?;
                Ok(get_battle_status_summary(&battle))
            }
            "attack" | "capture" | "heal" | "flee" | "switch" => {
                let action = parse_action_command(line)?;
                let outcome = self
                    .service
                    .perform_action(user, self.current_battle()?, action)
                    .await?;
                Ok(display_outcome(&outcome))
            }
            "team" => {
                let active = self.active_instance().await;
                Ok(display_roster(&self.service.list_instances(user).await?, active))
            }
            "toggle" => {
                let creature = self.service.toggle_membership(user, parse_id(args)?).await?;
                let place = if creature.on_team { "team" } else { "reserve" };
                Ok(format!("{} moved to the {}.", creature, place))
            }
            "swap" => {
                let (team, reserve) = args
                    .split_once(' ')
                    .ok_or_else(|| EncounterError::invalid("usage: swap <team id> <reserve id>"))?;
                let (benched, joined) = self
                    .service
                    .swap(user, parse_id(team)?, parse_id(reserve)?)
                    .await?;
                Ok(format!("{} joined the team; {} went to the reserve.", joined, benched))
            }
            "release" => {
                let creature = self.service.release(user, parse_id(args)?).await?;
                Ok(format!("{} was released.", creature))
            }
            "center" => {
                let count = self.service.heal_all(user).await?;
                Ok(format!("{} creatures were restored to full health.", count))
            }
            "revive" => {
                let creature = self.service.revive_one(user, parse_id(args)?).await?;
                Ok(format!("{} is back on its feet.", creature))
            }
            "reviveall" => {
                let count = self.service.revive_all(user).await?;
                Ok(format!("{} creatures were revived.", count))
            }
            "report" => Ok(display_health_report(
                &self.service.health_report(user).await?,
            )),
            "lookup" => Ok(handle_lookup_pokemon_command(
                &*self.service.species(args).await?,
            )),
            other => Err(EncounterError::invalid(format!(
                "unknown command '{}', type 'help'",
                other
            ))),
        }
    }
}

fn parse_id(arg: &str) -> EncounterResult<InstanceId> {
    arg.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .map(InstanceId)
        .map_err(|_| EncounterError::invalid(format!("'{}' is not a creature id", arg)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EncounterConfig::from_env()?;
    let catalog = Arc::new(RonCatalog::bundled(config.rng_seed)?);
    debug!(species = catalog.species_names().len(), "catalog loaded");

    let mut session = Session {
        service: EncounterService::new(catalog, Arc::new(InMemoryRepository::new()), config),
        auth: StaticAuth(UserId(1)),
        battle: None,
    };

    println!("Welcome to Pokemon Encounter! Type 'help' for commands.\n");
    println!("{}", display_starter_options(&session.service.starter_options().await?));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        match session.handle(line).await {
            Ok(text) => println!("{}", text),
            Err(err) => println!("Error: {}", err),
        }
    }

    println!("Goodbye!");
    Ok(())
}
