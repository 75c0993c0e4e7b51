//! Users dashboard data layer.
//!
//! The crate keeps the table state of a paginated user directory in query
//! parameters, caches pages per query, patches cached pages optimistically
//! on create, edit and delete, and records an activity log. The directory
//! itself is reached over HTTP or, offline, through a generated in-memory
//! copy.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
