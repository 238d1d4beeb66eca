use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of the player on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

/// Supplies the authenticated caller. Every service operation is scoped to it.
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> UserId;
}

/// Single fixed identity, used by the local front ends.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuth(pub UserId);

impl AuthContext for StaticAuth {
    fn current_user(&self) -> UserId {
        self.0
    }
}
