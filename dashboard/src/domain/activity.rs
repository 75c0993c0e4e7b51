//! Activity log of user-directory changes.
//!
//! A process-wide, newest-first record of successful create, update and
//! delete actions. The log is capped at [`MAX_ACTIVITY_ENTRIES`], persisted
//! after every mutation under [`ACTIVITY_LOG_KEY`], and restored on start.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::UserId;
use super::persisted::{load_state, save_state};
use super::ports::KeyValueStore;

/// Storage key for the persisted activity log.
pub const ACTIVITY_LOG_KEY: &str = "activity-log-storage";
/// Maximum number of retained entries.
pub const MAX_ACTIVITY_ENTRIES: usize = 100;

/// Kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        })
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action: ActivityAction,
    #[serde(with = "user_id_serde")]
    pub user_id: UserId,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

mod user_id_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::domain::UserId;

    pub(super) fn serialize<S: Serializer>(id: &UserId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(id.get())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
        u64::deserialize(deserializer).map(UserId::new)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ActivityState {
    #[serde(default)]
    logs: Vec<ActivityEntry>,
}

/// Persisted, capped activity log.
pub struct ActivityLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    entries: Mutex<Vec<ActivityEntry>>,
}

impl ActivityLog {
    /// Restore the log from `store`, starting empty when nothing readable is
    /// persisted.
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let mut entries = load_state::<ActivityState>(store.as_ref(), ACTIVITY_LOG_KEY)
            .unwrap_or_default()
            .logs;
        entries.truncate(MAX_ACTIVITY_ENTRIES);
        Self {
            store,
            clock,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ActivityEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prepend a new entry and persist the log.
    pub fn record(
        &self,
        action: ActivityAction,
        user_id: UserId,
        user_name: impl Into<String>,
        details: impl Into<String>,
    ) -> ActivityEntry {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            action,
            user_id,
            user_name: user_name.into(),
            timestamp: self.clock.utc(),
            details: details.into(),
        };
        info!(
            action = %entry.action,
            user_id = %entry.user_id,
            details = %entry.details,
            "recorded activity"
        );

        let mut entries = self.lock();
        entries.insert(0, entry.clone());
        entries.truncate(MAX_ACTIVITY_ENTRIES);
        self.persist(&entries);
        entry
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every entry and persist the empty log.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
        info!("cleared activity log");
    }

    fn persist(&self, entries: &[ActivityEntry]) {
        #[derive(Serialize)]
        struct ActivityStateRef<'a> {
            logs: &'a [ActivityEntry],
        }

        save_state(
            self.store.as_ref(),
            ACTIVITY_LOG_KEY,
            &ActivityStateRef { logs: entries },
        );
    }
}
