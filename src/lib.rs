//! Pokemon Encounter Engine
//!
//! Turn-based encounters between a player's creatures and a single wild
//! creature: attacks, counter-attacks, captures, heals and flight, plus the
//! roster management around them. Reference data comes from a cached
//! creature catalog; battles and owned creatures live behind a repository.

// --- MODULE DECLARATIONS ---
pub mod auth;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod healing;
pub mod locks;
pub mod mcp_interface;
pub mod player;
pub mod pokemon;
pub mod repository;
pub mod service;
pub mod species;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{BattleStatus, DamageRelations, TypeData};

// --- From this crate's modules (`src/`) ---

// Battle engine entry points and state.
pub use battle::engine::{resolve_action, ActionOutcome, CaptureReport};
pub use battle::state::{Battle, BattleEvent, BattleId, EventBus, TurnRng};

// Runtime types.
pub use auth::{AuthContext, StaticAuth, UserId};
pub use player::{PlayerAction, Roster};
pub use pokemon::{CreatureInstance, InstanceId};
pub use species::{MoveData, Species};

// Services and their collaborators.
pub use catalog::{CatalogCache, CreatureCatalog, RonCatalog};
pub use config::EncounterConfig;
pub use healing::HealthReport;
pub use repository::{EncounterRepository, InMemoryRepository};
pub use service::EncounterService;

// Crate-specific error and result types.
pub use errors::{EncounterError, EncounterResult, ErrorKind, Resource};
