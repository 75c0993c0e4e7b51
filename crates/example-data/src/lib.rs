//! Deterministic example directory users for offline dashboard demos.
//!
//! The crate generates believable, reproducible user records (person,
//! contact details, postal address, employer) from a numeric seed. It is
//! independent of the dashboard's domain types; callers convert the seeds
//! at the point of use.
//!
//! # Example
//!
//! ```
//! use example_data::generate_example_users;
//!
//! let users = generate_example_users(42, 3).expect("generation succeeds");
//! assert_eq!(users.len(), 3);
//!
//! // Same seed produces identical users
//! let again = generate_example_users(42, 3).expect("generation succeeds");
//! assert_eq!(users, again);
//! ```

mod error;
mod generator;
mod seed;

pub use error::GenerationError;
pub use generator::{MAX_EXAMPLE_USERS, generate_example_users};
pub use seed::{ExampleAddressSeed, ExampleCompanySeed, ExampleUserSeed};
