use crate::storage::StorageError;

/// Classified failures of tracker operations. Messages are meant to be shown to the user as is.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("activity \"{0}\" already exists")]
    DuplicateName(String),

    #[error("unknown activity name \"{0}\"")]
    ActivityNotFound(String),

    #[error("activity \"{0}\" has an unfinished session. please finish or remove it first")]
    SessionAlreadyOpen(String),

    #[error("activity \"{0}\" has no unfinished sessions. please create a new session")]
    NoOpenSession(String),

    #[error("activity name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
