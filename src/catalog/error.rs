use crate::errors::ErrorKind;
use thiserror::Error;

/// Failures while fetching reference data from a creature catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("unknown move '{0}'")]
    UnknownMove(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("catalog has no species to pick from")]
    Empty,

    #[error("catalog data is malformed: {0}")]
    Malformed(String),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::UnknownSpecies(_)
            | CatalogError::UnknownMove(_)
            | CatalogError::UnknownType(_) => ErrorKind::NotFound,
            CatalogError::Empty | CatalogError::Malformed(_) | CatalogError::Unavailable(_) => {
                ErrorKind::ServiceUnavailable
            }
        }
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
