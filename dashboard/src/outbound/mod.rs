//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **users_http**: reqwest-backed user directory client
//! - **memory**: in-memory user directory for offline demos and tests
//! - **storage**: file-backed and in-memory key-value stores
//! - **query_state**: query-string state over a `url::Url`
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod query_state;
pub mod storage;
pub mod users_http;
