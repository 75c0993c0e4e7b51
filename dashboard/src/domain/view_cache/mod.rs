//! Keyed cache of fetched user pages.
//!
//! The cache owns every fetched [`Page`] and is the only place they are
//! mutated. Reads serve fresh entries directly and otherwise go through the
//! [`UsersRepository`]; concurrent reads of the same key share one in-flight
//! request. Writes happen through [`EntityPatch`]es whose receipts can be
//! reverted.
//!
//! Locking: the inner state sits behind a `std::sync::Mutex` that is never
//! held across an `.await`.

mod patch;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use mockable::Clock;
use pagination::Page;
use tracing::{debug, warn};

use super::page_key::PageKey;
use super::ports::UsersRepository;
use super::{Error, User, UserId};

pub use patch::{EntityPatch, PatchEdit, PatchReceipt};

type SharedFetch = Shared<BoxFuture<'static, Result<Page<User>, Error>>>;

/// A cached page and when it was fetched.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    page: Page<User>,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PageKey, CacheEntry>,
    in_flight: HashMap<PageKey, SharedFetch>,
}

impl CacheState {
    fn detach(&mut self, key: &PageKey) {
        if self.in_flight.remove(key).is_some() {
            debug!(key = %key, "detached in-flight page fetch");
        }
    }
}

/// Keyed page cache with request de-duplication and optimistic patches.
pub struct ViewCache<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    stale_after: TimeDelta,
    state: Mutex<CacheState>,
}

impl<R> ViewCache<R> {
    /// Create an empty cache.
    ///
    /// Entries older than `stale_after` are refetched on the next read.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, stale_after: Duration) -> Self {
        Self {
            repository,
            clock,
            stale_after: TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX),
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        !entry.stale && now.signed_duration_since(entry.fetched_at) < self.stale_after
    }

    /// The cached page under `key`, fresh or not.
    pub fn peek(&self, key: &PageKey) -> Option<Page<User>> {
        self.lock().entries.get(key).map(|entry| entry.page.clone())
    }

    /// Whether a fetch for `key` is outstanding.
    pub fn is_fetching(&self, key: &PageKey) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Every cached page with its key.
    pub fn cached_pages(&self) -> Vec<(PageKey, Page<User>)> {
        self.lock()
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.page.clone()))
            .collect()
    }

    /// First cached copy of the user with `id`.
    pub fn find_user(&self, id: UserId) -> Option<User> {
        self.lock().entries.values().find_map(|entry| {
            entry
                .page
                .items()
                .iter()
                .find(|user| user.id == id)
                .cloned()
        })
    }

    /// Distinct company names across cached pages, sorted.
    pub fn company_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .lock()
            .entries
            .values()
            .flat_map(|entry| entry.page.items().iter().map(|user| user.company.name.clone()))
            .collect();
        names.into_iter().collect()
    }

    /// Mark matching entries stale and detach matching in-flight fetches.
    ///
    /// Detached fetches still answer their waiting callers but their results
    /// are not stored. Returns the number of entries marked stale.
    pub fn invalidate(&self, predicate: impl Fn(&PageKey) -> bool) -> usize {
        let mut state = self.lock();
        let mut invalidated = 0;
        for (key, entry) in &mut state.entries {
            if predicate(key) && !entry.stale {
                entry.stale = true;
                invalidated += 1;
            }
        }
        state.in_flight.retain(|key, _| !predicate(key));
        debug!(invalidated, "invalidated cached pages");
        invalidated
    }

    /// Invalidate every entry.
    pub fn invalidate_all(&self) -> usize {
        self.invalidate(|_| true)
    }

    /// Invalidate every entry the receipt did not edit.
    pub fn invalidate_untouched(&self, receipt: &PatchReceipt) -> usize {
        self.invalidate(|key| !receipt.touches(key))
    }

    /// Apply `patch` to every cached page and return its receipt.
    pub fn patch_entities(&self, patch: &EntityPatch) -> PatchReceipt {
        let mut state = self.lock();
        let receipt = patch::apply(&mut state.entries, patch);
        for edit in receipt.edits() {
            state.detach(edit.key());
        }
        debug!(
            kind = patch.kind(),
            user_id = %patch.user_id(),
            edits = receipt.edits().len(),
            "applied cache patch"
        );
        receipt
    }

    /// Apply the inverse of every edit in `receipt`.
    pub fn revert(&self, receipt: PatchReceipt) {
        let mut state = self.lock();
        for edit in receipt.edits() {
            state.detach(edit.key());
        }
        let edits = receipt.edits().len();
        patch::revert(&mut state.entries, receipt);
        debug!(edits, "reverted cache patch");
    }
}

impl<R> ViewCache<R>
where
    R: UsersRepository + 'static,
{
    /// Serve the page under `key`, fetching it when absent, invalidated or
    /// older than the staleness window.
    ///
    /// Concurrent calls for the same key share one repository request.
    pub async fn fetch_page(&self, key: &PageKey) -> Result<Page<User>, Error> {
        let fetch = {
            let mut state = self.lock();
            let now = self.clock.utc();
            if let Some(entry) = state.entries.get(key) {
                if self.is_fresh(entry, now) {
                    debug!(key = %key, "serving cached page");
                    return Ok(entry.page.clone());
                }
            }
            if let Some(existing) = state.in_flight.get(key) {
                debug!(key = %key, "joining in-flight page fetch");
                existing.clone()
            } else {
                let started = self.start_fetch(key);
                state.in_flight.insert(key.clone(), started.clone());
                started
            }
        };

        let result = fetch.clone().await;

        let mut state = self.lock();
        let owns_slot = state
            .in_flight
            .get(key)
            .is_some_and(|current| current.ptr_eq(&fetch));
        if owns_slot {
            state.in_flight.remove(key);
            match &result {
                Ok(page) => {
                    state.entries.insert(
                        key.clone(),
                        CacheEntry {
                            page: page.clone(),
                            fetched_at: self.clock.utc(),
                            stale: false,
                        },
                    );
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "page fetch failed");
                }
            }
        }
        result
    }

    fn start_fetch(&self, key: &PageKey) -> SharedFetch {
        let repository = Arc::clone(&self.repository);
        let query = key.query();
        let fingerprint = key.fingerprint();
        async move {
            debug!(key = %fingerprint, "fetching page");
            repository.list_page(&query).await.map_err(Error::from)
        }
        .boxed()
        .shared()
    }
}
