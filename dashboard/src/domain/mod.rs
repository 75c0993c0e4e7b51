//! Domain model and services for the users dashboard.
//!
//! Purpose: hold the client-side data-view layer. Query-parameter driven
//! table state, a keyed page cache with optimistic patches, and the
//! orchestrator that wires user actions to them. Everything outside the
//! process is reached through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: recoverable failure with a stable category.
//! - User, NewUser, UserForm: directory records and the form that edits them.
//! - ViewState / ViewStateStore: filter, sort and page state.
//! - ViewCache, PageKey, EntityPatch, PatchReceipt: cached pages and patches.
//! - Dashboard: the orchestrator.
//! - ActivityLog, SettingsStore, NotificationCentre: persisted and transient
//!   stores injected into the orchestrator.

pub mod activity;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod format;
pub mod notifications;
pub mod page_key;
pub mod ports;
pub mod settings;
pub mod user;
pub mod view_cache;
pub mod view_state;

mod persisted;

pub use self::activity::{
    ACTIVITY_LOG_KEY, ActivityAction, ActivityEntry, ActivityLog, MAX_ACTIVITY_ENTRIES,
};
pub use self::dashboard::{
    DEFAULT_STALE_AFTER, Dashboard, DashboardOptions, DashboardPorts, DashboardView, DeleteOutcome,
    ViewStatus,
};
pub use self::error::{Error, ErrorCode};
pub use self::form::{FormErrors, FormField, UserForm};
pub use self::format::{initials, relative_time};
pub use self::notifications::{DEFAULT_TOAST_TTL, NotificationCentre, Toast, ToastId, ToastKind};
pub use self::page_key::PageKey;
pub use self::settings::{SETTINGS_KEY, SettingsStore, Theme};
pub use self::user::{Address, Company, Geo, NewUser, User, UserId};
pub use self::view_cache::{EntityPatch, PatchEdit, PatchReceipt, ViewCache};
pub use self::view_state::{CompanySelection, SortOrder, ViewState, ViewStateStore};
