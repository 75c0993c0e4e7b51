//! Transient toast notifications.
//!
//! Toasts stay visible until dismissed or until their time-to-live elapses.
//! Expiry is evaluated lazily against the injected clock whenever the active
//! toasts are read. Every toast is also emitted as a `tracing` event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{info, warn};

/// Time-to-live applied when none is configured.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(5);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

/// Identifier of a shown toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

/// A visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Queue of visible toasts.
pub struct NotificationCentre {
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    next_id: AtomicU64,
    toasts: Mutex<Vec<Toast>>,
}

impl NotificationCentre {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            next_id: AtomicU64::new(1),
            toasts: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show a toast.
    pub fn show(&self, kind: ToastKind, title: impl Into<String>) -> ToastId {
        let toast = Toast {
            id: ToastId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            kind,
            title: title.into(),
            created_at: self.clock.utc(),
        };
        match kind {
            ToastKind::Error | ToastKind::Warning => {
                warn!(kind = %kind, title = %toast.title, "notification");
            }
            ToastKind::Success | ToastKind::Info => {
                info!(kind = %kind, title = %toast.title, "notification");
            }
        }
        let id = toast.id;
        self.lock().push(toast);
        id
    }

    pub fn success(&self, title: impl Into<String>) -> ToastId {
        self.show(ToastKind::Success, title)
    }

    pub fn error(&self, title: impl Into<String>) -> ToastId {
        self.show(ToastKind::Error, title)
    }

    /// Dismiss a toast. Returns `false` when it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// Visible toasts, oldest first. Expired toasts are pruned.
    pub fn active(&self) -> Vec<Toast> {
        let now = self.clock.utc();
        let mut toasts = self.lock();
        toasts.retain(|toast| now.signed_duration_since(toast.created_at) < self.ttl);
        toasts.clone()
    }
}
