// Pokemon Encounter Schema - Shared type definitions
// This crate contains the reference-data shapes returned by the creature catalog
// and the battle status enum, shared between the engine and its front ends.

// Re-export the main types
pub use battle_data::*;
pub use move_data::*;
pub use species_data::*;
pub use type_data::*;

pub mod battle_data;
pub mod move_data;
pub mod species_data;
pub mod type_data;
