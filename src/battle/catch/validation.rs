use crate::battle::context::EncounterContext;
use crate::config::EncounterConfig;
use crate::errors::{EncounterError, Resource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum CaptureError {
    /// Every capture attempt of this battle has been used
    #[error("no capture attempts left")]
    NoAttemptsLeft,
    /// The reserve has no room for a newly captured creature
    #[error("reserve is full")]
    ReserveFull,
}

impl From<CaptureError> for EncounterError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NoAttemptsLeft => EncounterError::ResourceExhausted(Resource::Captures),
            CaptureError::ReserveFull => EncounterError::ResourceExhausted(Resource::ReserveSlots),
        }
    }
}

/// Validate a capture attempt before any roll is made.
///
/// A full reserve only blocks the attempt when a success would actually
/// store a new creature, i.e. the species is not owned yet.
pub fn can_attempt_capture(
    ctx: &EncounterContext,
    config: &EncounterConfig,
) -> Result<(), CaptureError> {
    if ctx.battle.captures_remaining == 0 {
        return Err(CaptureError::NoAttemptsLeft);
    }

    let already_owned = ctx.owned_species(&ctx.battle.wild_species).is_some();
    if !already_owned && ctx.reserve_count() >= config.reserve_capacity {
        return Err(CaptureError::ReserveFull);
    }

    Ok(())
}
