//! Generated user seed types.
//!
//! These types mirror the directory's JSON user shape without depending on
//! the dashboard crate.

use serde::{Deserialize, Serialize};

/// Postal address of a generated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleAddressSeed {
    /// Street name.
    pub street: String,
    /// Suite or apartment.
    pub suite: String,
    /// City name.
    pub city: String,
    /// Postal code.
    pub zipcode: String,
    /// Latitude in decimal degrees, formatted to four places.
    pub lat: String,
    /// Longitude in decimal degrees, formatted to four places.
    pub lng: String,
}

/// Employer of a generated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCompanySeed {
    /// Company name. Generated users share a small pool of companies.
    pub name: String,
    /// Marketing catch phrase.
    pub catch_phrase: String,
    /// Business-speak tagline.
    pub bs: String,
}

/// A generated example user record.
///
/// # Example
///
/// ```
/// use example_data::generate_example_users;
///
/// let users = generate_example_users(7, 1).expect("generated");
/// let user = users.first().expect("one user");
/// assert_eq!(user.id, 1);
/// assert!(user.email.contains('@'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleUserSeed {
    /// Sequential identifier starting at 1.
    pub id: u32,
    /// Full name.
    pub name: String,
    /// Login handle.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Personal website host name.
    pub website: String,
    /// Postal address.
    pub address: ExampleAddressSeed,
    /// Employer.
    pub company: ExampleCompanySeed,
}
