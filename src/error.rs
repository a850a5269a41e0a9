//! Error taxonomy for the matching core.
//!
//! Workflow failures are synchronous and always surfaced to the caller;
//! nothing in the core retries. Infrastructure failures are wrapped so the
//! HTTP layer can log them in full and return a sanitized message.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The two sides of a join request cannot be paired: same kind, different
    /// hackathons, a participant who already has a team, a full team, or a
    /// duplicate pending request.
    #[error("Invalid pairing: {0}")]
    InvalidPairing(String),

    /// The join request has already been accepted or rejected.
    #[error("Join request {0} is already resolved")]
    AlreadyResolved(uuid::Uuid),

    #[error("{0} not found")]
    NotFound(String),

    /// The team filled up before this acceptance could claim a slot.
    #[error("Team {0} has no open roles")]
    CapacityExceeded(uuid::Uuid),

    /// Roster input that fails validation.
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn invalid_pairing(reason: impl Into<String>) -> Self {
        Self::InvalidPairing(reason.into())
    }

    /// Whether the error describes a caller mistake rather than an
    /// infrastructure failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Serialization(_))
    }
}
