//! Dashboard orchestrator.
//!
//! Reads the current [`ViewState`], serves the matching page through the
//! [`ViewCache`], and turns create/edit/delete actions into repository calls
//! plus cache patches, activity entries and toasts.
//!
//! Reads: state -> cache key -> [`ViewCache::fetch_page`] -> view. A response
//! whose key no longer matches the current state is discarded.
//!
//! Writes: repository call -> [`EntityPatch`] -> activity -> toast. Deletes
//! patch first and revert on failure; creates and edits patch once the
//! directory has answered.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mockable::Clock;
use pagination::{DEFAULT_PAGE_SIZE, PageRequest, PaginationError};
use tracing::{debug, info, warn};

use super::activity::{ActivityAction, ActivityLog};
use super::form::UserForm;
use super::notifications::{DEFAULT_TOAST_TTL, NotificationCentre};
use super::page_key::PageKey;
use super::ports::{KeyValueStore, QueryState, UsersRepository};
use super::settings::SettingsStore;
use super::view_cache::{EntityPatch, ViewCache};
use super::view_state::{CompanySelection, SortOrder, ViewState, ViewStateStore};
use super::{Error, User, UserId};

/// Staleness window applied when none is configured.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

/// Ports the dashboard is assembled from.
pub struct DashboardPorts<R, Q> {
    /// Remote user directory.
    pub repository: Arc<R>,
    /// Query parameters holding the table state.
    pub query: Arc<Q>,
    /// Storage for the activity log and settings.
    pub store: Arc<dyn KeyValueStore>,
    /// Time source for cache freshness, toasts and activity timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Tunables for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Rows per page.
    pub page_size: u32,
    /// How long a cached page is served without refetching.
    pub stale_after: Duration,
    /// How long a toast stays visible.
    pub toast_ttl: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stale_after: DEFAULT_STALE_AFTER,
            toast_ttl: DEFAULT_TOAST_TTL,
        }
    }
}

/// Load status of the displayed page.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// Nothing requested for the current state yet.
    Idle,
    /// A fetch for the current state is outstanding.
    Loading,
    /// The page for the current state is cached.
    Ready,
    /// The last fetch for the current state failed.
    Failed(Error),
}

/// What the table shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub state: ViewState,
    pub status: ViewStatus,
    /// Rows of the current page, ordered by email.
    pub users: Vec<User>,
    pub total_count: Option<u64>,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// A delete for the same row was already in progress; nothing was sent.
    AlreadyPending,
}

#[derive(Debug, Clone)]
struct Displayed {
    key: Option<PageKey>,
    status: ViewStatus,
}

/// Removes the id from the pending set when the delete finishes.
struct PendingDelete<'a> {
    pending: &'a Mutex<HashSet<UserId>>,
    id: UserId,
}

impl<'a> PendingDelete<'a> {
    fn acquire(pending: &'a Mutex<HashSet<UserId>>, id: UserId) -> Option<Self> {
        let inserted = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then_some(Self { pending, id })
    }
}

impl Drop for PendingDelete<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn pagination_error(error: PaginationError) -> Error {
    Error::validation(error.to_string())
}

fn compare_emails(left: &User, right: &User, order: SortOrder) -> CmpOrdering {
    let ordering = left.email.to_lowercase().cmp(&right.email.to_lowercase());
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// The users dashboard.
pub struct Dashboard<R, Q> {
    repository: Arc<R>,
    cache: ViewCache<R>,
    state: ViewStateStore<Q>,
    activity: ActivityLog,
    notifications: NotificationCentre,
    settings: SettingsStore,
    page_size: u32,
    displayed: Mutex<Displayed>,
    known_total_pages: AtomicU64,
    pending_deletes: Mutex<HashSet<UserId>>,
}

impl<R, Q> Dashboard<R, Q>
where
    R: UsersRepository + 'static,
    Q: QueryState,
{
    /// Assemble a dashboard, restoring persisted activity and settings.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `options.page_size` is out of range.
    pub fn new(ports: DashboardPorts<R, Q>, options: DashboardOptions) -> Result<Self, Error> {
        PageRequest::first(options.page_size).map_err(pagination_error)?;
        let DashboardPorts {
            repository,
            query,
            store,
            clock,
        } = ports;
        Ok(Self {
            cache: ViewCache::new(Arc::clone(&repository), Arc::clone(&clock), options.stale_after),
            repository,
            state: ViewStateStore::new(query),
            activity: ActivityLog::load(Arc::clone(&store), Arc::clone(&clock)),
            notifications: NotificationCentre::new(clock, options.toast_ttl),
            settings: SettingsStore::load(store),
            page_size: options.page_size,
            displayed: Mutex::new(Displayed {
                key: None,
                status: ViewStatus::Idle,
            }),
            known_total_pages: AtomicU64::new(1),
            pending_deletes: Mutex::new(HashSet::new()),
        })
    }

    /// View state store backing the table.
    pub fn state(&self) -> &ViewStateStore<Q> {
        &self.state
    }

    /// Page cache shared by reads and patches.
    pub fn cache(&self) -> &ViewCache<R> {
        &self.cache
    }

    /// Persisted activity log.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Visible toasts.
    pub fn notifications(&self) -> &NotificationCentre {
        &self.notifications
    }

    /// Persisted user settings.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Rows per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn displayed(&self) -> MutexGuard<'_, Displayed> {
        self.displayed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_key(&self) -> Result<PageKey, Error> {
        self.state
            .snapshot()
            .page_key(self.page_size)
            .map_err(pagination_error)
    }

    /// Total pages of the current result set, as last observed.
    pub fn total_pages(&self) -> u64 {
        self.current_key()
            .ok()
            .and_then(|key| self.cache.peek(&key))
            .map_or_else(
                || self.known_total_pages.load(Ordering::Relaxed),
                |page| page.total_pages(),
            )
    }

    /// Snapshot of what the table shows.
    pub fn view(&self) -> DashboardView {
        let state = self.state.snapshot();
        let key = state.page_key(self.page_size).ok();
        let displayed = self.displayed().clone();
        let status = if displayed.key.is_some() && displayed.key == key {
            displayed.status
        } else {
            ViewStatus::Idle
        };

        let page = key.as_ref().and_then(|key| self.cache.peek(key));
        let (mut users, total_count, total_pages, has_next) = match page {
            Some(page) => {
                let total_count = page.total_count();
                let total_pages = page.total_pages();
                let has_next = page.has_next();
                (page.into_items(), total_count, total_pages, has_next)
            }
            None => (Vec::new(), None, self.known_total_pages.load(Ordering::Relaxed), false),
        };
        users.sort_by(|left, right| compare_emails(left, right, state.sort));

        DashboardView {
            has_previous: state.page > 1,
            state,
            status,
            users,
            total_count,
            total_pages,
            has_next,
        }
    }

    fn mark(&self, key: &PageKey, status: ViewStatus) {
        let mut displayed = self.displayed();
        displayed.key = Some(key.clone());
        displayed.status = status;
    }

    /// Load the page for the current state.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the page for the still-current state
    /// could not be loaded.
    pub async fn refresh(&self) -> Result<DashboardView, Error> {
        let key = self.current_key()?;
        self.mark(&key, ViewStatus::Loading);

        loop {
            let result = self.cache.fetch_page(&key).await;

            if self.current_key()? != key {
                debug!(key = %key, "discarding response for superseded view state");
                return Ok(self.view());
            }
            match result {
                // A patch or invalidation detached the fetch; its page was not stored.
                Ok(_) if self.cache.peek(&key).is_none() => {
                    debug!(key = %key, "fetch detached before it was stored; refetching");
                }
                Ok(page) => {
                    self.known_total_pages.store(page.total_pages(), Ordering::Relaxed);
                    self.mark(&key, ViewStatus::Ready);
                    return Ok(self.view());
                }
                Err(error) => {
                    self.mark(&key, ViewStatus::Failed(error.clone()));
                    return Err(error);
                }
            }
        }
    }

    /// Refresh on every view state change until the state store closes.
    ///
    /// Sort-only changes re-order the displayed page without a fetch.
    pub async fn follow(&self) {
        let mut changes = self.state.subscribe();
        let mut previous = changes.borrow_and_update().clone();
        self.refresh_quietly().await;
        while changes.changed().await.is_ok() {
            let next = changes.borrow_and_update().clone();
            let sort_only = next.page == previous.page
                && next.search == previous.search
                && next.company == previous.company;
            if sort_only {
                debug!(sort = %next.sort, "re-sorting displayed page");
            } else {
                self.refresh_quietly().await;
            }
            previous = next;
        }
    }

    async fn refresh_quietly(&self) {
        if let Err(error) = self.refresh().await {
            debug!(error = %error, "view refresh failed");
        }
    }

    /// Change the search term. Returns to page 1.
    pub fn set_search(&self, term: impl Into<String>) -> Result<ViewState, Error> {
        self.state.set_search(term)
    }

    /// Change the company filter. Returns to page 1.
    pub fn set_company(&self, company: CompanySelection) -> Result<ViewState, Error> {
        self.state.set_company(company)
    }

    pub fn set_sort(&self, sort: SortOrder) -> Result<ViewState, Error> {
        self.state.set_sort(sort)
    }

    pub fn toggle_sort(&self) -> Result<ViewState, Error> {
        self.state.toggle_sort()
    }

    pub fn clear_filters(&self) -> Result<ViewState, Error> {
        self.state.clear_filters()
    }

    /// Move to `page`, clamped to the known page count.
    pub fn go_to_page(&self, page: u32) -> Result<ViewState, Error> {
        self.state.set_page(page, self.total_pages())
    }

    /// Company names offered by the filter: every company on a cached page.
    pub fn company_options(&self) -> Vec<String> {
        self.cache.company_names()
    }

    /// Whether a delete for `id` is in progress.
    pub fn is_delete_pending(&self, id: UserId) -> bool {
        self.pending_deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Create a user from `form`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without contacting the directory, when
    /// the form is invalid; otherwise the directory's error.
    pub async fn add_user(&self, form: &UserForm) -> Result<User, Error> {
        form.validate()?;
        let created = match self.repository.create(&form.to_new_user(None)).await {
            Ok(created) => created,
            Err(error) => {
                warn!(error = %error, "create user failed");
                self.notifications.error("Failed to create user");
                return Err(error.into());
            }
        };

        let receipt = self
            .cache
            .patch_entities(&EntityPatch::InsertFront(created.clone()));
        self.cache.invalidate_untouched(&receipt);
        self.activity.record(
            ActivityAction::Created,
            created.id,
            created.name.as_str(),
            format!("Created user {} ({})", created.name, created.email),
        );
        info!(user_id = %created.id, "created user");
        self.notifications.success("User created successfully");
        Ok(created)
    }

    /// Update user `id` from `form`, keeping its address and company
    /// tagline.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without contacting the directory, when
    /// the form is invalid; otherwise the directory's error.
    pub async fn edit_user(&self, id: UserId, form: &UserForm) -> Result<User, Error> {
        form.validate()?;
        let result = match self.user(id).await {
            Ok(existing) => self
                .repository
                .update(id, &form.to_new_user(Some(&existing)))
                .await
                .map_err(Error::from),
            Err(error) => Err(error),
        };
        let updated = match result {
            Ok(updated) => updated,
            Err(error) => {
                warn!(user_id = %id, error = %error, "update user failed");
                self.notifications.error("Failed to update user");
                return Err(error);
            }
        };

        let _receipt = self
            .cache
            .patch_entities(&EntityPatch::Replace(updated.clone()));
        self.activity.record(
            ActivityAction::Updated,
            updated.id,
            updated.name.as_str(),
            format!("Updated user {} ({})", updated.name, updated.email),
        );
        info!(user_id = %updated.id, "updated user");
        self.notifications.success("User updated successfully");
        Ok(updated)
    }

    /// User `id`, from the cache when a cached page holds it.
    ///
    /// # Errors
    ///
    /// Returns the directory's error when the user has to be fetched and
    /// the fetch fails.
    pub async fn user(&self, id: UserId) -> Result<User, Error> {
        if let Some(user) = self.cache.find_user(id) {
            return Ok(user);
        }
        self.repository.get_by_id(id).await.map_err(Error::from)
    }

    /// Delete user `id`, removing it from the view before the directory
    /// answers.
    ///
    /// A second call while the first is in flight does nothing. On failure
    /// the row is restored.
    ///
    /// # Errors
    ///
    /// Returns the directory's error after the row has been restored.
    pub async fn delete_user(&self, id: UserId) -> Result<DeleteOutcome, Error> {
        let Some(_pending) = PendingDelete::acquire(&self.pending_deletes, id) else {
            debug!(user_id = %id, "delete already in progress");
            return Ok(DeleteOutcome::AlreadyPending);
        };

        let known = self.cache.find_user(id);
        let receipt = self.cache.patch_entities(&EntityPatch::Remove(id));

        if let Err(error) = self.repository.delete(id).await {
            self.cache.revert(receipt);
            warn!(user_id = %id, error = %error, "delete user failed; row restored");
            self.notifications.error("Failed to delete user");
            return Err(error.into());
        }

        // Pages fetched while the delete was pending may still hold the row.
        let confirmed = self.cache.patch_entities(&EntityPatch::Remove(id));
        if !confirmed.is_empty() {
            debug!(
                user_id = %id,
                edits = confirmed.edits().len(),
                "removed row refetched during delete"
            );
        }
        self.cache.invalidate_untouched(&receipt);
        let (user_name, details) = match known {
            Some(user) => (
                user.name.clone(),
                format!("Deleted user {} ({})", user.name, user.email),
            ),
            None => (format!("User {id}"), format!("Deleted user {id}")),
        };
        self.activity.record(ActivityAction::Deleted, id, user_name, details);
        info!(user_id = %id, "deleted user");
        self.notifications.success("User deleted successfully");

        if let Err(error) = self.step_back_if_empty() {
            warn!(error = %error, "failed to leave emptied page");
        }
        Ok(DeleteOutcome::Deleted)
    }

    fn step_back_if_empty(&self) -> Result<(), Error> {
        let state = self.state.snapshot();
        if state.page <= 1 {
            return Ok(());
        }
        let Some(page) = self.cache.peek(&self.current_key()?) else {
            return Ok(());
        };
        if page.items().is_empty() {
            let total_pages = page.total_pages();
            self.known_total_pages.store(total_pages, Ordering::Relaxed);
            self.state.set_page(state.page - 1, total_pages)?;
        }
        Ok(())
    }
}
