use tracing::{debug, info, instrument};

use crate::{storage::ActivityRepository, utils::clock::Clock};

use super::{
    entities::{Activity, Session},
    error::TrackerError,
    stats::{compute_stats, ActivityStats},
};

/// What renaming does when the new name already belongs to another activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenamePolicy {
    /// Fail with [TrackerError::DuplicateName].
    #[default]
    Reject,
    /// Rename anyway. Later lookups by that name find the first activity carrying it.
    AllowDuplicates,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceConfig {
    pub rename_policy: RenamePolicy,
}

/// Entry point for every tracker operation. Each mutating operation loads the whole snapshot,
/// validates, mutates the local copy and saves it back. Nothing is saved when validation fails.
pub struct ActivityService<R: ActivityRepository> {
    repository: R,
    clock: Box<dyn Clock>,
    config: ServiceConfig,
}

impl<R: ActivityRepository> ActivityService<R> {
    pub fn new(repository: R, clock: Box<dyn Clock>, config: ServiceConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_activity(&self, name: &str) -> Result<(), TrackerError> {
        validate_name(name)?;
        let mut activities = self.repository.load().await?;

        if position_of(&activities, name).is_some() {
            return Err(TrackerError::DuplicateName(name.to_owned()));
        }

        activities.push(Activity::new(name));
        self.repository.save(&activities).await?;
        info!("Created activity {name:?}");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn start_session(&self, name: &str) -> Result<Session, TrackerError> {
        let mut activities = self.repository.load().await?;
        let index = find_existing(&activities, name)?;

        let session = activities[index]
            .start_session(self.clock.time())?
            .clone();

        self.repository.save(&activities).await?;
        info!("Started session of {name:?} at {}", session.started_at);
        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn stop_session(&self, name: &str) -> Result<Session, TrackerError> {
        let mut activities = self.repository.load().await?;
        let index = find_existing(&activities, name)?;

        let session = activities[index].stop_session(self.clock.time())?.clone();

        self.repository.save(&activities).await?;
        info!("Stopped session of {name:?} started at {}", session.started_at);
        Ok(session)
    }

    /// Removes the activity called `name`. Removing an unknown activity is not an error, the
    /// result tells whether anything was removed.
    #[instrument(skip(self))]
    pub async fn remove_activity(&self, name: &str) -> Result<bool, TrackerError> {
        let mut activities = self.repository.load().await?;

        let Some(index) = position_of(&activities, name) else {
            debug!("Nothing to remove for {name:?}");
            return Ok(false);
        };

        activities.remove(index);
        self.repository.save(&activities).await?;
        info!("Removed activity {name:?}");
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn rename_activity(&self, old_name: &str, new_name: &str) -> Result<(), TrackerError> {
        let mut activities = self.repository.load().await?;
        let index = find_existing(&activities, old_name)?;
        validate_name(new_name)?;

        if old_name == new_name {
            return Ok(());
        }

        if self.config.rename_policy == RenamePolicy::Reject
            && position_of(&activities, new_name).is_some()
        {
            return Err(TrackerError::DuplicateName(new_name.to_owned()));
        }

        activities[index].name = new_name.to_owned();
        self.repository.save(&activities).await?;
        info!("Renamed activity {old_name:?} to {new_name:?}");
        Ok(())
    }

    pub async fn list_activity_names(&self) -> Result<Vec<String>, TrackerError> {
        let activities = self.repository.load().await?;
        Ok(activities.into_iter().map(|v| v.name).collect())
    }

    /// Activities that are being tracked right now, in stored order.
    pub async fn list_open_activities(&self) -> Result<Vec<Activity>, TrackerError> {
        let activities = self.repository.load().await?;
        Ok(activities
            .into_iter()
            .filter(Activity::has_open_session)
            .collect())
    }

    pub async fn get_stats(&self, name: &str) -> Result<ActivityStats, TrackerError> {
        let activities = self.repository.load().await?;
        let index = find_existing(&activities, name)?;
        Ok(compute_stats(&activities[index], self.clock.time()))
    }

    pub async fn get_all_stats(&self) -> Result<Vec<ActivityStats>, TrackerError> {
        let activities = self.repository.load().await?;
        let now = self.clock.time();
        Ok(activities.iter().map(|v| compute_stats(v, now)).collect())
    }
}

fn validate_name(name: &str) -> Result<(), TrackerError> {
    if name.is_empty() {
        Err(TrackerError::EmptyName)
    } else {
        Ok(())
    }
}

/// First activity with exactly this name.
fn position_of(activities: &[Activity], name: &str) -> Option<usize> {
    activities.iter().position(|v| v.name == name)
}

fn find_existing(activities: &[Activity], name: &str) -> Result<usize, TrackerError> {
    position_of(activities, name).ok_or_else(|| TrackerError::ActivityNotFound(name.to_owned()))
}
