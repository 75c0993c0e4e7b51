//! Directory user data model.
//!
//! Users are identified by a server-assigned integer id. Everything else is
//! plain descriptive data; email format is only checked when a form is
//! submitted (see [`crate::domain::UserForm`]).

use std::fmt;

/// Server-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic coordinates, kept as the strings the directory returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

impl Default for Address {
    /// Placeholder address given to users created through the form.
    fn default() -> Self {
        Self {
            street: "123 Main St".to_owned(),
            suite: "Apt 1".to_owned(),
            city: "New York".to_owned(),
            zipcode: "10001".to_owned(),
            geo: Geo {
                lat: "40.7128".to_owned(),
                lng: "-74.0060".to_owned(),
            },
        }
    }
}

/// Employer details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

impl Company {
    /// A company with the placeholder catch phrase and tagline.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catch_phrase: "Innovation at its finest".to_owned(),
            bs: "synergize scalable supply-chains".to_owned(),
        }
    }
}

/// A user record without its identifier; the body of create and update
/// requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

/// A directory user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Address,
    pub company: Company,
}

impl User {
    /// Attach an identifier to a new user record.
    pub fn from_new(id: UserId, data: NewUser) -> Self {
        let NewUser {
            name,
            username,
            email,
            phone,
            website,
            address,
            company,
        } = data;
        Self {
            id,
            name,
            username,
            email,
            phone,
            website,
            address,
            company,
        }
    }

    /// Strip the identifier, yielding a request body.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            company: self.company.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> NewUser {
        NewUser {
            name: "Ada Lovelace".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            website: "ada.dev".to_owned(),
            address: Address::default(),
            company: Company::named("Analytical Engines"),
        }
    }

    #[rstest]
    fn from_new_and_back_preserves_fields() {
        let user = User::from_new(UserId::new(11), sample());
        assert_eq!(user.id.get(), 11);
        assert_eq!(user.to_new_user(), sample());
    }

    #[rstest]
    fn default_address_matches_form_placeholder() {
        let address = Address::default();
        assert_eq!(address.city, "New York");
        assert_eq!(address.geo.lng, "-74.0060");
    }

    #[rstest]
    fn user_id_displays_raw_value() {
        assert_eq!(UserId::from(42).to_string(), "42");
    }
}
