//! Persistence boundary for battles and owned creatures.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{RepositoryError, Result};
pub use memory::InMemoryRepository;
pub use traits::EncounterRepository;
