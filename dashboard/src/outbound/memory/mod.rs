//! In-memory user directory.
//!
//! Implements the same contract as the HTTP directory over a `Vec<User>`:
//! server-side filtering, offset pagination with a total count, and id
//! assignment as `max(id) + 1`. Used for offline demos and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pagination::Page;
use tracing::debug;

use crate::domain::ports::{UserListQuery, UsersRepository, UsersRepositoryError};
use crate::domain::{NewUser, User, UserId};

#[cfg(feature = "example-data")]
mod example;

/// User directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryUsersRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsersRepository {
    /// Directory holding `users` in the given order.
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    /// Copy of every stored user.
    pub fn snapshot(&self) -> Vec<User> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(id: UserId) -> UsersRepositoryError {
    UsersRepositoryError::status(404_u16, format!("user {id} not found"))
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn list_page(&self, query: &UserListQuery) -> Result<Page<User>, UsersRepositoryError> {
        let users = self.lock();
        let matching: Vec<&User> = users.iter().filter(|user| query.matches(user)).collect();
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.request.page_size()).unwrap_or(usize::MAX);
        let items: Vec<User> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        debug!(
            page = query.request.page(),
            returned = items.len(),
            total,
            "served in-memory page"
        );
        Page::new(items, query.request, Some(total))
            .map_err(|error| UsersRepositoryError::decode(error.to_string()))
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, UsersRepositoryError> {
        self.lock()
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, user: &NewUser) -> Result<User, UsersRepositoryError> {
        let mut users = self.lock();
        let next_id = users
            .iter()
            .map(|existing| existing.id.get())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let created = User::from_new(UserId::new(next_id), user.clone());
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: UserId, user: &NewUser) -> Result<User, UsersRepositoryError> {
        let mut users = self.lock();
        let slot = users
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| not_found(id))?;
        *slot = User::from_new(id, user.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), UsersRepositoryError> {
        let mut users = self.lock();
        let index = users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| not_found(id))?;
        users.remove(index);
        Ok(())
    }
}
