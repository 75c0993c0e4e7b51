//! Seeding the in-memory directory from generated example users.

use example_data::{ExampleUserSeed, GenerationError, generate_example_users};
use tracing::info;

use super::InMemoryUsersRepository;
use crate::domain::{Address, Company, Geo, User, UserId};

impl From<ExampleUserSeed> for User {
    fn from(seed: ExampleUserSeed) -> Self {
        Self {
            id: UserId::new(u64::from(seed.id)),
            name: seed.name,
            username: seed.username,
            email: seed.email,
            phone: seed.phone,
            website: seed.website,
            address: Address {
                street: seed.address.street,
                suite: seed.address.suite,
                city: seed.address.city,
                zipcode: seed.address.zipcode,
                geo: Geo {
                    lat: seed.address.lat,
                    lng: seed.address.lng,
                },
            },
            company: Company {
                name: seed.company.name,
                catch_phrase: seed.company.catch_phrase,
                bs: seed.company.bs,
            },
        }
    }
}

impl InMemoryUsersRepository {
    /// Directory populated with `count` generated users.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when `count` exceeds the generator's limit.
    pub fn with_example_users(seed: u64, count: usize) -> Result<Self, GenerationError> {
        let users: Vec<User> = generate_example_users(seed, count)?
            .into_iter()
            .map(User::from)
            .collect();
        info!(seed, count = users.len(), "seeded in-memory directory");
        Ok(Self::new(users))
    }
}
