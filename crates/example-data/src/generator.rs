//! Deterministic user generation from a numeric seed.
//!
//! The same `(seed, count)` pair always produces identical output, so demos
//! and snapshot-style assertions stay stable across runs.

use fake::Fake;
use fake::faker::address::raw::{CityName, SecondaryAddress, StreetName, ZipCode};
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::{FirstName, LastName};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::EN;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::GenerationError;
use crate::seed::{ExampleAddressSeed, ExampleCompanySeed, ExampleUserSeed};

/// Largest number of users a single call may generate.
pub const MAX_EXAMPLE_USERS: usize = 10_000;

/// Maximum number of attempts to generate a name with an ASCII handle.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Number of distinct companies shared by generated users.
const COMPANY_POOL_SIZE: usize = 4;

const CATCH_PHRASE_ADJECTIVES: &[&str] = &[
    "Multi-layered",
    "Proactive",
    "Face to face",
    "Synchronised",
    "Configurable",
    "Implemented",
];
const CATCH_PHRASE_NOUNS: &[&str] = &[
    "client-server neural-net",
    "didactic contingency",
    "bifurcated forecast",
    "transitional hierarchy",
    "heuristic frame",
    "intranet middleware",
];
const BS_VERBS: &[&str] = &["harness", "synergize", "e-enable", "transition", "revolutionize"];
const BS_NOUNS: &[&str] = &[
    "real-time e-markets",
    "scalable supply-chains",
    "end-to-end models",
    "cutting-edge web services",
    "B2C channels",
];
const WEBSITE_SUFFIXES: &[&str] = &["org", "net", "info", "biz", "io"];

/// Generates `count` example users from `seed`.
///
/// Users get sequential ids starting at 1, share a small pool of companies so
/// company filters group them, and carry addresses with plausible
/// coordinates.
///
/// # Errors
///
/// Returns [`GenerationError`] if:
/// - `count` exceeds [`MAX_EXAMPLE_USERS`]
/// - name generation fails after the maximum number of retries
///
/// # Example
///
/// ```
/// use example_data::generate_example_users;
///
/// let users = generate_example_users(42, 10).expect("generated");
/// assert_eq!(users.len(), 10);
/// assert!(users.iter().all(|user| !user.company.name.is_empty()));
/// ```
pub fn generate_example_users(
    seed: u64,
    count: usize,
) -> Result<Vec<ExampleUserSeed>, GenerationError> {
    if count > MAX_EXAMPLE_USERS {
        return Err(GenerationError::TooManyUsers {
            requested: count,
            max: MAX_EXAMPLE_USERS,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let companies: Vec<ExampleCompanySeed> = (0..COMPANY_POOL_SIZE)
        .map(|_| generate_company(&mut rng))
        .collect();

    let mut users = Vec::with_capacity(count);
    for id in (1_u32..).take(count) {
        let index = rng.random_range(0..COMPANY_POOL_SIZE);
        let company = companies
            .get(index)
            .cloned()
            .unwrap_or_else(|| generate_company(&mut rng));
        users.push(generate_single_user(&mut rng, id, company)?);
    }
    Ok(users)
}

fn generate_single_user(
    rng: &mut ChaCha8Rng,
    id: u32,
    company: ExampleCompanySeed,
) -> Result<ExampleUserSeed, GenerationError> {
    let (first, last) = generate_name(rng)?;
    let first_handle = ascii_handle(&first);
    let last_handle = ascii_handle(&last);
    let domain = ascii_handle(&company.name);
    let suffix = pick_str(rng, WEBSITE_SUFFIXES);

    Ok(ExampleUserSeed {
        id,
        name: format!("{first} {last}"),
        username: format!("{first_handle}.{last_handle}"),
        email: format!("{first_handle}.{last_handle}@{domain}.com"),
        phone: PhoneNumber(EN).fake_with_rng(rng),
        website: format!("{last_handle}.{suffix}"),
        address: generate_address(rng),
        company,
    })
}

/// Generates a first and last name whose ASCII handles are non-empty.
fn generate_name(rng: &mut ChaCha8Rng) -> Result<(String, String), GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        if !ascii_handle(&first).is_empty() && !ascii_handle(&last).is_empty() {
            return Ok((first, last));
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

fn generate_company(rng: &mut ChaCha8Rng) -> ExampleCompanySeed {
    let name: String = CompanyName(EN).fake_with_rng(rng);
    let catch_phrase = format!(
        "{} {}",
        pick_str(rng, CATCH_PHRASE_ADJECTIVES),
        pick_str(rng, CATCH_PHRASE_NOUNS)
    );
    let bs = format!("{} {}", pick_str(rng, BS_VERBS), pick_str(rng, BS_NOUNS));
    ExampleCompanySeed {
        name,
        catch_phrase,
        bs,
    }
}

fn generate_address(rng: &mut ChaCha8Rng) -> ExampleAddressSeed {
    let latitude: f64 = rng.random_range(-90.0..=90.0);
    let longitude: f64 = rng.random_range(-180.0..=180.0);
    ExampleAddressSeed {
        street: StreetName(EN).fake_with_rng(rng),
        suite: SecondaryAddress(EN).fake_with_rng(rng),
        city: CityName(EN).fake_with_rng(rng),
        zipcode: ZipCode(EN).fake_with_rng(rng),
        lat: format!("{latitude:.4}"),
        lng: format!("{longitude:.4}"),
    }
}

/// Lowercase ASCII alphanumerics of `raw`, used for handles and hosts.
fn ascii_handle(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn pick_str(rng: &mut ChaCha8Rng, pool: &[&'static str]) -> &'static str {
    let index = rng.random_range(0..pool.len());
    pool.get(index).copied().unwrap_or_default()
}
