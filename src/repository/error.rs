//! Error types raised by repository implementations.

use crate::auth::UserId;
use crate::battle::state::BattleId;
use crate::errors::ErrorKind;
use crate::pokemon::InstanceId;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("encounter repository lock was poisoned")]
    LockPoisoned,

    #[error("{owner} already owns a {species}")]
    DuplicateSpecies { owner: UserId, species: String },

    #[error("battle {0} is not stored")]
    MissingBattle(BattleId),

    #[error("creature {0} is not stored")]
    MissingInstance(InstanceId),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::DuplicateSpecies { .. } => ErrorKind::InvalidAction,
            RepositoryError::MissingBattle(_) | RepositoryError::MissingInstance(_) => {
                ErrorKind::NotFound
            }
            RepositoryError::LockPoisoned => ErrorKind::ServiceUnavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
