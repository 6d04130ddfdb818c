use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, instrument};

use crate::{tracker::entities::Activity, utils::json::to_tab_indented_json};

use super::{ActivityRepository, StorageError};

/// The main realization of [ActivityRepository]. The whole snapshot lives in a single JSON file
/// inside the storage directory.
#[derive(Debug)]
pub struct JsonActivityStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonActivityStorage {
    pub const FILE_NAME: &'static str = "bin.json";

    /// Opens the store in `storage_dir`, creating the directory and an empty snapshot file if
    /// they don't exist yet.
    pub fn new(storage_dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&storage_dir).map_err(StorageError::io(&storage_dir))?;
        let path = storage_dir.join(Self::FILE_NAME);

        match std::fs::File::options()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                debug!("Initializing empty storage at {path:?}");
                file.write_all(b"[]").map_err(StorageError::io(&path))?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StorageError::io(&path)(e)),
        }

        Ok(Self {
            lock_path: path.with_extension("json.lock"),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open_lock(&self) -> Result<File, StorageError> {
        File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.lock_path)
            .await
            .map_err(StorageError::io(&self.lock_path))
    }

    async fn read_snapshot(&self) -> Result<Vec<Activity>, StorageError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Storage file {:?} is missing, treating it as empty", self.path);
                return Ok(vec![]);
            }
            Err(e) => return Err(StorageError::io(&self.path)(e)),
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(vec![]);
        }

        serde_json::from_slice(&content).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes into a sibling file first and renames it over the snapshot, so the snapshot is
    /// either the old one or the new one.
    async fn replace_snapshot(&self, buffer: &[u8]) -> Result<(), StorageError> {
        let tmp_path = self.path.with_extension("json.tmp");

        let mut file = File::create(&tmp_path)
            .await
            .map_err(StorageError::io(&tmp_path))?;
        file.write_all(buffer)
            .await
            .map_err(StorageError::io(&tmp_path))?;
        file.sync_all().await.map_err(StorageError::io(&tmp_path))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(StorageError::io(&self.path))
    }
}

impl ActivityRepository for JsonActivityStorage {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<Vec<Activity>, StorageError> {
        let lock = self.open_lock().await?;
        lock.lock_shared().map_err(StorageError::io(&self.lock_path))?;
        let result = self.read_snapshot().await;
        lock.unlock_async()
            .await
            .map_err(StorageError::io(&self.lock_path))?;

        let activities = result?;
        debug!("Loaded {} activities", activities.len());
        Ok(activities)
    }

    #[instrument(skip(self, activities), fields(path = ?self.path, count = activities.len()))]
    async fn save(&self, activities: &[Activity]) -> Result<(), StorageError> {
        let buffer = to_tab_indented_json(activities)?;

        // Semi-safe acquire-release, readers never see a half written snapshot.
        let lock = self.open_lock().await?;
        lock.lock_exclusive()
            .map_err(StorageError::io(&self.lock_path))?;
        let result = self.replace_snapshot(&buffer).await;
        lock.unlock_async()
            .await
            .map_err(StorageError::io(&self.lock_path))?;

        result
    }
}
