//!  Storage of activities is organized through [ActivityRepository].
//!  The basic idea is:
//!   - The whole set of activities is a single snapshot.
//!   - Loading returns the last saved snapshot, saving replaces it as a whole.
//!   - [json_storage::JsonActivityStorage] keeps the snapshot in one JSON file,
//!     [memory::InMemoryStorage] keeps it in memory.

pub mod json_storage;
pub mod memory;

use std::{future::Future, ops::Deref, path::PathBuf};

use crate::tracker::entities::Activity;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage access failed: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file is malformed: {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode activities")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }
}

/// Interface for abstracting storage of activities.
///
/// There is no locking across a load and the following save. Two processes working on the same
/// store at once may both load the same snapshot, in which case the last save wins.
pub trait ActivityRepository {
    /// Retrieves the last saved snapshot. A store that was never saved to yields no activities.
    fn load(&self) -> impl Future<Output = Result<Vec<Activity>, StorageError>>;

    /// Replaces the stored snapshot with `activities`.
    fn save(&self, activities: &[Activity]) -> impl Future<Output = Result<(), StorageError>>;
}

impl<T: Deref> ActivityRepository for T
where
    T::Target: ActivityRepository,
{
    fn load(&self) -> impl Future<Output = Result<Vec<Activity>, StorageError>> {
        self.deref().load()
    }

    fn save(&self, activities: &[Activity]) -> impl Future<Output = Result<(), StorageError>> {
        self.deref().save(activities)
    }
}
