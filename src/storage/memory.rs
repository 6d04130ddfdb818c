use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::tracker::entities::Activity;

use super::{ActivityRepository, StorageError};

/// Keeps the snapshot in memory. Handy for embedding the tracker and for tests, since it counts
/// how many times the snapshot was saved.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    activities: Mutex<Vec<Activity>>,
    saves: AtomicUsize,
}

impl InMemoryStorage {
    pub fn with_activities(activities: Vec<Activity>) -> Self {
        Self {
            activities: Mutex::new(activities),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Activity> {
        self.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Activity>> {
        // A poisoned lock still holds a complete snapshot, saves swap it in one assignment.
        self.activities
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActivityRepository for InMemoryStorage {
    async fn load(&self) -> Result<Vec<Activity>, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, activities: &[Activity]) -> Result<(), StorageError> {
        *self.lock() = activities.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
