use crate::battle::state::{BattleId, BattleStatus};
use crate::player::AccountId;
use schema::{RecordId, SpeciesId};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the creature arena battle engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("Creature not found: {0}")]
    CreatureNotFound(RecordId),
    #[error("Species not found: {0}")]
    SpeciesNotFound(SpeciesId),
    #[error("Battle not found: {0}")]
    BattleNotFound(BattleId),

    #[error("Battle already finished")]
    BattleAlreadyFinished,
    #[error("Not player turn (battle is in {0})")]
    NotPlayerTurn(BattleStatus),
    #[error("Special ability was already used in this battle")]
    AbilityUnavailable,

    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("No suitable opponent found in the catalog")]
    NoOpponentFound,

    /// A collaborator (store) failed. Not retried here.
    #[error("Store error: {0}")]
    Store(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification the request layer maps onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
    NoOpponentFound,
    Infrastructure,
}

impl ArenaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArenaError::AccountNotFound(_)
            | ArenaError::CreatureNotFound(_)
            | ArenaError::SpeciesNotFound(_)
            | ArenaError::BattleNotFound(_) => ErrorKind::NotFound,
            ArenaError::BattleAlreadyFinished
            | ArenaError::NotPlayerTurn(_)
            | ArenaError::AbilityUnavailable => ErrorKind::InvalidState,
            ArenaError::UnknownAction(_) | ArenaError::MissingIdentifier(_) => {
                ErrorKind::InvalidInput
            }
            ArenaError::NoOpponentFound => ErrorKind::NoOpponentFound,
            ArenaError::Store(_) | ArenaError::Config(_) => ErrorKind::Infrastructure,
        }
    }
}

impl From<postcard::Error> for ArenaError {
    fn from(err: postcard::Error) -> Self {
        ArenaError::Store(format!("session encoding failed: {}", err))
    }
}

impl From<ron::error::SpannedError> for ArenaError {
    fn from(err: ron::error::SpannedError) -> Self {
        ArenaError::Config(err.to_string())
    }
}

pub type ArenaResult<T> = Result<T, ArenaError>;
