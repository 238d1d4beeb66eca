//! Pokemon Encounter MCP Server
//!
//! A Model Context Protocol server (rmcp) that exposes the encounter service
//! to an LLM. Every tool runs on behalf of a single local player.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};

use pokemon_encounter::battle::state::BattleId;
use pokemon_encounter::mcp_interface::*;
use pokemon_encounter::{
    AuthContext, EncounterConfig, EncounterError, EncounterService, ErrorKind, InMemoryRepository,
    InstanceId, PlayerAction, RonCatalog, StaticAuth, UserId,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tracing::{info, warn};

#[derive(Clone)]
pub struct PokemonEncounterServer {
    tool_router: ToolRouter<PokemonEncounterServer>,
    service: Arc<EncounterService>,
    auth: Arc<dyn AuthContext>,
    /// Battle the tools act on when no id is given.
    current_battle: Arc<Mutex<Option<BattleId>>>,
}

// Tool request structures
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChooseStarterRequest {
    #[schemars(description = "Starter species to pick, e.g. 'charmander'")]
    pub species_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BattleRequest {
    #[schemars(description = "Battle id; defaults to the most recently started battle")]
    pub battle_id: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ActionRequest {
    #[schemars(description = "One of: attack, capture, heal, flee, switch")]
    pub action: String,
    #[schemars(description = "Move to use when attacking")]
    pub move_name: Option<String>,
    #[schemars(description = "Creature to send in when switching")]
    pub instance_id: Option<u64>,
    #[schemars(description = "Battle id; defaults to the most recently started battle")]
    pub battle_id: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InstanceRequest {
    #[schemars(description = "Id of one of your creatures")]
    pub instance_id: u64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SwapRequest {
    #[schemars(description = "Team creature moving to the reserve")]
    pub team_instance_id: u64,
    #[schemars(description = "Reserve creature joining the team")]
    pub reserve_instance_id: u64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupPokemonRequest {
    #[schemars(description = "Name of the Pokemon species to look up")]
    pub species_name: String,
}

/// Rule violations are reported to the player as text; infrastructure
/// failures become protocol errors.
fn respond(result: Result<String, EncounterError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(err) if err.kind() == ErrorKind::ServiceUnavailable => {
            warn!(error = %err, "tool call failed");
            Err(McpError {
                code: ErrorCode(-32603),
                message: Cow::from(err.to_string()),
                data: None,
            })
        }
        Err(err) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Error: {}",
            err
        ))])),
    }
}

#[tool_router]
impl PokemonEncounterServer {
    pub fn new(service: EncounterService, auth: Arc<dyn AuthContext>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service: Arc::new(service),
            auth,
            current_battle: Arc::new(Mutex::new(None)),
        }
    }

    fn user(&self) -> UserId {
        self.auth.current_user()
    }

    fn battle_id(&self, requested: Option<u64>) -> Result<BattleId, EncounterError> {
        if let Some(id) = requested {
            return Ok(BattleId(id));
        }
        let current = *self
            .current_battle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        current.ok_or_else(|| {
            EncounterError::invalid("no battle has been started, use 'start_battle' first")
        })
    }

    #[tool(description = "List the species a new player can choose as their first creature")]
    async fn starter_options(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .starter_options()
            .await
            .map(|options| display_starter_options(&options));
        respond(result)
    }

    #[tool(description = "Choose your first creature; only possible while you own none")]
    async fn choose_starter(
        &self,
        Parameters(request): Parameters<ChooseStarterRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .choose_starter(self.user(), &request.species_name)
            .await
            .map(|starter| format!("You chose {}! It joins your team.", starter));
        respond(result)
    }

    #[tool(description = "Start an encounter with a random wild Pokemon")]
    async fn start_battle(&self) -> Result<CallToolResult, McpError> {
        let result = self.service.start_battle(self.user()).await.map(|battle| {
            *self
                .current_battle
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(battle.id);
            format!(
                "A wild Pokemon appeared!\n{}",
                get_battle_status_summary(&battle)
            )
        });
        respond(result)
    }

    #[tool(description = "Get the state of a battle")]
    async fn get_battle_state(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.battle_id(request.battle_id) {
            Ok(id) => self
                .service
                .get_battle(self.user(), id)
                .await
                .map(|battle| get_battle_status_summary(&battle)),
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Take a battle action: attack (with move_name), capture, heal, flee or switch (with instance_id)")]
    async fn battle_action(
        &self,
        Parameters(request): Parameters<ActionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = serde_json::json!({
            "move_name": request.move_name,
            "instance_id": request.instance_id,
        });
        let result = match self.battle_id(request.battle_id) {
            Ok(id) => self
                .service
                .perform_tagged_action(self.user(), id, &request.action, &params)
                .await
                .map(|outcome| display_outcome(&outcome)),
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "Flee from the current battle")]
    async fn flee(
        &self,
        Parameters(request): Parameters<BattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.battle_id(request.battle_id) {
            Ok(id) => self
                .service
                .perform_action(self.user(), id, PlayerAction::Flee)
                .await
                .map(|outcome| display_outcome(&outcome)),
            Err(err) => Err(err),
        };
        respond(result)
    }

    #[tool(description = "List your team and reserve")]
    async fn list_creatures(&self) -> Result<CallToolResult, McpError> {
        let user = self.user();
        let active = match self.battle_id(None) {
            Ok(id) => self
                .service
                .get_battle(user, id)
                .await
                .ok()
                .filter(|battle| battle.is_active())
                .and_then(|battle| battle.active_instance),
            Err(_) => None,
        };
        let result = self
            .service
            .list_instances(user)
            .await
            .map(|roster| display_roster(&roster, active));
        respond(result)
    }

    #[tool(description = "Move a creature between the team and the reserve")]
    async fn toggle_membership(
        &self,
        Parameters(request): Parameters<InstanceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .toggle_membership(self.user(), InstanceId(request.instance_id))
            .await
            .map(|creature| {
                let place = if creature.on_team { "team" } else { "reserve" };
                format!("{} moved to the {}.", creature, place)
            });
        respond(result)
    }

    #[tool(description = "Swap a team creature with a reserve creature")]
    async fn swap(
        &self,
        Parameters(request): Parameters<SwapRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .swap(
                self.user(),
                InstanceId(request.team_instance_id),
                InstanceId(request.reserve_instance_id),
            )
            .await
            .map(|(benched, joined)| {
                format!("{} joined the team; {} went to the reserve.", joined, benched)
            });
        respond(result)
    }

    #[tool(description = "Release one of your creatures for good")]
    async fn release(
        &self,
        Parameters(request): Parameters<InstanceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .release(self.user(), InstanceId(request.instance_id))
            .await
            .map(|creature| format!("{} was released. Bye!", creature));
        respond(result)
    }

    #[tool(description = "Restore all your creatures to full HP")]
    async fn heal_all(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .heal_all(self.user())
            .await
            .map(|count| format!("{} creatures were restored to full health.", count));
        respond(result)
    }

    #[tool(description = "Restore one creature to full HP")]
    async fn heal_one(
        &self,
        Parameters(request): Parameters<InstanceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .heal_one(self.user(), InstanceId(request.instance_id))
            .await
            .map(|creature| format!("{} is fully healed.", creature));
        respond(result)
    }

    #[tool(description = "Revive a fainted creature at half HP")]
    async fn revive_one(
        &self,
        Parameters(request): Parameters<InstanceRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .revive_one(self.user(), InstanceId(request.instance_id))
            .await
            .map(|creature| format!("{} is back on its feet.", creature));
        respond(result)
    }

    #[tool(description = "Revive every fainted creature at half HP")]
    async fn revive_all(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .revive_all(self.user())
            .await
            .map(|count| format!("{} creatures were revived.", count));
        respond(result)
    }

    #[tool(description = "Show the health of every creature you own")]
    async fn health_report(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .health_report(self.user())
            .await
            .map(|report| display_health_report(&report));
        respond(result)
    }

    #[tool(description = "Look up detailed information about a Pokemon species")]
    async fn lookup_pokemon(
        &self,
        Parameters(request): Parameters<LookupPokemonRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .service
            .species(&request.species_name)
            .await
            .map(|species| handle_lookup_pokemon_command(&species));
        respond(result)
    }
}

#[tool_handler]
impl ServerHandler for PokemonEncounterServer {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EncounterConfig::from_env()?;
    let catalog = Arc::new(RonCatalog::bundled(config.rng_seed)?);
    let service = EncounterService::new(catalog, Arc::new(InMemoryRepository::new()), config);
    let server = PokemonEncounterServer::new(service, Arc::new(StaticAuth(UserId(1))));

    info!("Pokemon Encounter MCP server starting");
    let running = server.serve((stdin(), stdout())).await?;
    let quit_reason = running.waiting().await?;

    info!(?quit_reason, "Pokemon Encounter MCP server exiting");
    Ok(())
}
