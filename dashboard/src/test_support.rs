//! Test utilities for the dashboard crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use pagination::Page;
use tokio::sync::{Notify, Semaphore};

use crate::domain::ports::{UserListQuery, UsersRepository, UsersRepositoryError};
use crate::domain::{Address, Company, NewUser, User, UserId};
use crate::outbound::memory::InMemoryUsersRepository;
use crate::outbound::storage::FileKeyValueStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock reading `secs` seconds after the Unix epoch.
    pub fn at_epoch_offset(secs: i64) -> Self {
        Self::new(DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Repository operation, used to address gates and injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// In-memory directory whose calls can be recorded, held and failed.
///
/// A held operation blocks every call to it until [`release`] or
/// [`release_one`]. Injected failures are consumed by the next call.
///
/// [`release`]: GatedUsersRepository::release
/// [`release_one`]: GatedUsersRepository::release_one
#[derive(Default)]
pub struct GatedUsersRepository {
    inner: InMemoryUsersRepository,
    calls: Mutex<Vec<RepositoryOperation>>,
    called: Notify,
    gates: Mutex<HashMap<RepositoryOperation, Arc<Semaphore>>>,
    failures: Mutex<HashMap<RepositoryOperation, UsersRepositoryError>>,
}

impl GatedUsersRepository {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            inner: InMemoryUsersRepository::new(users),
            ..Self::default()
        }
    }

    /// Directory users, in storage order.
    pub fn users(&self) -> Vec<User> {
        self.inner.snapshot()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RepositoryOperation> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: RepositoryOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Wait until `operation` has been called at least `count` times.
    pub async fn wait_for_calls(&self, operation: RepositoryOperation, count: usize) {
        loop {
            let notified = self.called.notified();
            if self.call_count(operation) >= count {
                return;
            }
            notified.await;
        }
    }

    /// Block calls to `operation` until released.
    pub fn hold(&self, operation: RepositoryOperation) {
        lock(&self.gates).insert(operation, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call through.
    pub fn release_one(&self, operation: RepositoryOperation) {
        if let Some(gate) = lock(&self.gates).get(&operation) {
            gate.add_permits(1);
        }
    }

    /// Let every held and future call through.
    pub fn release(&self, operation: RepositoryOperation) {
        if let Some(gate) = lock(&self.gates).remove(&operation) {
            gate.close();
        }
    }

    /// Fail the next call to `operation` with `error`.
    pub fn fail_next(&self, operation: RepositoryOperation, error: UsersRepositoryError) {
        lock(&self.failures).insert(operation, error);
    }

    async fn enter(&self, operation: RepositoryOperation) -> Result<(), UsersRepositoryError> {
        lock(&self.calls).push(operation);
        self.called.notify_waiters();

        let gate = lock(&self.gates).get(&operation).cloned();
        if let Some(gate) = gate {
            // A closed gate means the operation was released.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match lock(&self.failures).remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UsersRepository for GatedUsersRepository {
    async fn list_page(&self, query: &UserListQuery) -> Result<Page<User>, UsersRepositoryError> {
        self.enter(RepositoryOperation::List).await?;
        self.inner.list_page(query).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, UsersRepositoryError> {
        self.enter(RepositoryOperation::Get).await?;
        self.inner.get_by_id(id).await
    }

    async fn create(&self, user: &NewUser) -> Result<User, UsersRepositoryError> {
        self.enter(RepositoryOperation::Create).await?;
        self.inner.create(user).await
    }

    async fn update(&self, id: UserId, user: &NewUser) -> Result<User, UsersRepositoryError> {
        self.enter(RepositoryOperation::Update).await?;
        self.inner.update(id, user).await
    }

    async fn delete(&self, id: UserId) -> Result<(), UsersRepositoryError> {
        self.enter(RepositoryOperation::Delete).await?;
        self.inner.delete(id).await
    }
}

/// A directory user with predictable fields.
///
/// The email is derived from the name so email ordering follows name
/// ordering.
pub fn sample_user(id: u64, name: &str, company: &str) -> User {
    let handle: String = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    User {
        id: UserId::new(id),
        name: name.to_owned(),
        username: handle.clone(),
        email: format!("{handle}@example.com"),
        phone: format!("555-{id:04}"),
        website: format!("{handle}.example.com"),
        address: Address::default(),
        company: Company::named(company),
    }
}

/// `count` users numbered from 1, alternating between two companies.
pub fn sample_users(count: u64) -> Vec<User> {
    (1..=count)
        .map(|id| {
            let company = if id % 2 == 0 { "Globex" } else { "Initech" };
            sample_user(id, &format!("User {id:02}"), company)
        })
        .collect()
}

/// File store inside a fresh temporary directory.
///
/// Keep the returned [`tempfile::TempDir`] alive for as long as the store is
/// used.
pub fn temp_file_store() -> std::io::Result<(tempfile::TempDir, FileKeyValueStore)> {
    let dir = tempfile::tempdir()?;
    let store = FileKeyValueStore::open(dir.path())?;
    Ok((dir, store))
}
