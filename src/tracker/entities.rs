use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use super::error::TrackerError;

/// One contiguous interval of time spent on an activity. A session without `ended_at` is open,
/// meaning the activity is being tracked right now.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub started_at: DateTime<Utc>,
    #[serde(default, with = "open_end")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn open(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// A named pursuit together with its session history. Sessions are kept in the order they were
/// started, and only the last one may be open.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    pub name: String,
    #[serde(default, deserialize_with = "session_history")]
    pub sessions: Vec<Session>,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sessions: vec![],
        }
    }

    /// Returns the last session if it's still running.
    pub fn open_session(&self) -> Option<&Session> {
        self.sessions.last().filter(|v| v.is_open())
    }

    pub fn has_open_session(&self) -> bool {
        self.open_session().is_some()
    }

    /// Appends a new open session starting at `at`.
    pub fn start_session(&mut self, at: DateTime<Utc>) -> Result<&Session, TrackerError> {
        if self.has_open_session() {
            return Err(TrackerError::SessionAlreadyOpen(self.name.clone()));
        }
        self.sessions.push(Session::open(at));
        Ok(&self.sessions[self.sessions.len() - 1])
    }

    /// Closes the last session at `at`. A clock that went backwards closes the session with zero
    /// length, so `ended_at` never precedes `started_at`.
    pub fn stop_session(&mut self, at: DateTime<Utc>) -> Result<&Session, TrackerError> {
        match self.sessions.last_mut() {
            Some(session) if session.is_open() => {
                session.ended_at = Some(at.max(session.started_at));
                Ok(session)
            }
            Some(_) | None => Err(TrackerError::NoOpenSession(self.name.clone())),
        }
    }
}

/// Reads `null` as no sessions and refuses histories where an open session isn't the last one.
fn session_history<'de, D>(deserializer: D) -> Result<Vec<Session>, D::Error>
where
    D: Deserializer<'de>,
{
    let sessions = Option::<Vec<Session>>::deserialize(deserializer)?.unwrap_or_default();
    let before_last = sessions.len().saturating_sub(1);
    if let Some(index) = sessions[..before_last].iter().position(Session::is_open) {
        return Err(D::Error::custom(format!(
            "session {index} is open but is not the last session"
        )));
    }
    Ok(sessions)
}

/// `null` marks an open session. Older files mark it with the zero time
/// `0001-01-01T00:00:00Z` instead, which is read back as open too.
mod open_end {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    const LEGACY_UNSET_TIMESTAMP: i64 = -62_135_596_800;

    pub fn serialize<S>(ended_at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ended_at {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ended_at = Option::<DateTime<Utc>>::deserialize(deserializer)?;
        Ok(ended_at.filter(|v| v.timestamp() != LEGACY_UNSET_TIMESTAMP))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::tracker::error::TrackerError;

    use super::{Activity, Session};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    #[test]
    fn test_start_appends_open_session() -> Result<()> {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::new("reading");
        activity.sessions.push(Session {
            started_at: start - Duration::hours(2),
            ended_at: Some(start - Duration::hours(1)),
        });

        let session = activity.start_session(start)?.clone();

        assert_eq!(session, Session::open(start));
        assert_eq!(activity.sessions.len(), 2);
        assert_eq!(activity.open_session(), Some(&session));
        assert_eq!(activity.sessions.iter().filter(|v| v.is_open()).count(), 1);
        Ok(())
    }

    #[test]
    fn test_start_with_open_session_fails() {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::new("reading");
        activity.start_session(start).unwrap();
        let before = activity.clone();

        let result = activity.start_session(start + Duration::minutes(1));

        assert!(matches!(result, Err(TrackerError::SessionAlreadyOpen(name)) if name == "reading"));
        assert_eq!(activity, before);
    }

    #[test]
    fn test_stop_closes_last_session() -> Result<()> {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::new("reading");
        activity.start_session(start)?;

        let session = activity.stop_session(start + Duration::minutes(30))?.clone();

        assert_eq!(session.ended_at, Some(start + Duration::minutes(30)));
        assert!(!activity.has_open_session());
        Ok(())
    }

    #[test]
    fn test_stop_without_open_session_fails() -> Result<()> {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::new("reading");

        assert!(matches!(
            activity.stop_session(start),
            Err(TrackerError::NoOpenSession(_))
        ));

        activity.start_session(start)?;
        activity.stop_session(start + Duration::seconds(5))?;

        assert!(matches!(
            activity.stop_session(start + Duration::seconds(10)),
            Err(TrackerError::NoOpenSession(_))
        ));
        Ok(())
    }

    #[test]
    fn test_stop_before_start_is_clamped() -> Result<()> {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::new("reading");
        activity.start_session(start)?;

        let session = activity.stop_session(start - Duration::minutes(3))?;

        assert_eq!(session.ended_at, Some(start));
        Ok(())
    }

    #[test]
    fn test_open_session_serializes_as_null() -> Result<()> {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let value = serde_json::to_value(Session::open(start))?;

        assert_eq!(
            value,
            serde_json::json!({ "startedAt": "2018-07-04T00:00:00Z", "endedAt": null })
        );
        Ok(())
    }

    #[test]
    fn test_legacy_zero_time_reads_as_open() -> Result<()> {
        let activity: Activity = serde_json::from_str(
            r#"{
                "name": "guitar",
                "sessions": [
                    { "startedAt": "2024-03-01T10:00:00+02:00", "endedAt": "2024-03-01T11:30:00+02:00" },
                    { "startedAt": "2024-03-02T10:00:00+02:00", "endedAt": "0001-01-01T00:00:00Z" }
                ]
            }"#,
        )?;

        assert_eq!(
            activity.sessions[0].ended_at.map(|v| v - activity.sessions[0].started_at),
            Some(Duration::minutes(90))
        );
        assert!(activity.has_open_session());
        Ok(())
    }

    #[test]
    fn test_open_session_before_last_is_rejected() {
        let result = serde_json::from_str::<Activity>(
            r#"{
                "name": "reading",
                "sessions": [
                    { "startedAt": "2018-07-04T00:00:00Z", "endedAt": null },
                    { "startedAt": "2018-07-04T01:00:00Z", "endedAt": "2018-07-04T02:00:00Z" }
                ]
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_null_sessions_read_as_empty() -> Result<()> {
        let activity: Activity = serde_json::from_str(r#"{ "name": "chess", "sessions": null }"#)?;
        assert_eq!(activity, Activity::new("chess"));

        let activity: Activity = serde_json::from_str(r#"{ "name": "chess" }"#)?;
        assert_eq!(activity, Activity::new("chess"));
        Ok(())
    }
}
