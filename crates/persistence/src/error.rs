use thiserror::Error;

use medrec_core::{DomainError, LocalId};

/// Errors from the in-memory session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("kind '{0}' is not registered")]
    UnknownKind(&'static str),

    #[error("{0} record has no uuid")]
    MissingUuid(&'static str),

    #[error("uuid '{0}' already belongs to another record")]
    DuplicateUuid(String),

    /// The id is taken by a row with another uuid: either a different record, or this
    /// record saved before its uuid was changed.
    #[error("{kind} #{local_id} is already stored with uuid '{stored_uuid}'")]
    LocalIdTaken {
        kind: &'static str,
        local_id: LocalId,
        stored_uuid: String,
    },

    #[error("requested {requested}, stored record is {actual}")]
    WrongKind {
        requested: &'static str,
        actual: &'static str,
    },

    #[error("local ids exhausted for {0}")]
    IdsExhausted(&'static str),

    #[error("session lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Domain(#[from] DomainError),
}
