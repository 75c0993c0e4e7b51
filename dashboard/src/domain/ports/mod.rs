//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod key_value_store;
mod query_state;
mod users_repository;

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
#[cfg(test)]
pub use query_state::MockQueryState;
pub use query_state::{QueryState, QueryStateError, QueryUpdate};
#[cfg(test)]
pub use users_repository::MockUsersRepository;
pub use users_repository::{UserListQuery, UsersRepository, UsersRepositoryError};
