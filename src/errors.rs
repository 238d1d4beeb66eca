use crate::battle::state::BattleId;
use crate::catalog::CatalogError;
use crate::repository::RepositoryError;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Coarse classification every error reduces to, so callers can branch on
/// the kind of failure without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ErrorKind {
    NotFound,
    InvalidAction,
    BattleAlreadyEnded,
    ResourceExhausted,
    MoveNotOwned,
    ServiceUnavailable,
}

/// A bounded resource whose depletion rejects an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Resource {
    #[strum(serialize = "capture attempts")]
    Captures,
    #[strum(serialize = "heal attempts")]
    Heals,
    #[strum(serialize = "team slots")]
    TeamSlots,
    #[strum(serialize = "reserve slots")]
    ReserveSlots,
}

/// Main error type for the Pokemon Encounter battle engine
#[derive(Debug, Error)]
pub enum EncounterError {
    /// Battle, creature instance or move is absent or not owned by the caller
    #[error("not found: {0}")]
    NotFound(String),

    /// Action does not fit the current state or is malformed
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("battle {0} has already ended")]
    BattleAlreadyEnded(BattleId),

    #[error("no {0} left")]
    ResourceExhausted(Resource),

    #[error("{species} does not know the move '{move_name}'")]
    MoveNotOwned { species: String, move_name: String },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EncounterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncounterError::NotFound(_) => ErrorKind::NotFound,
            EncounterError::InvalidAction(_) => ErrorKind::InvalidAction,
            EncounterError::BattleAlreadyEnded(_) => ErrorKind::BattleAlreadyEnded,
            EncounterError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            EncounterError::MoveNotOwned { .. } => ErrorKind::MoveNotOwned,
            EncounterError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            EncounterError::Catalog(err) => err.kind(),
            EncounterError::Repository(err) => err.kind(),
        }
    }

    pub fn invalid(details: impl Into<String>) -> Self {
        EncounterError::InvalidAction(details.into())
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        EncounterError::NotFound(details.into())
    }
}

/// Type alias for Results using EncounterError
pub type EncounterResult<T> = Result<T, EncounterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_of_wrapped_errors() {
        let err = EncounterError::from(CatalogError::UnknownSpecies("missingno".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = EncounterError::from(CatalogError::Unavailable("timeout".to_string()));
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);

        let err = EncounterError::from(RepositoryError::LockPoisoned);
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_resource_messages() {
        let err = EncounterError::ResourceExhausted(Resource::Captures);
        assert_eq!(err.to_string(), "no capture attempts left");
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);

        let err = EncounterError::ResourceExhausted(Resource::TeamSlots);
        assert_eq!(err.to_string(), "no team slots left");
    }
}
