//! Port for the remote user directory.
//!
//! The [`UsersRepository`] trait is a pure request/response boundary: no
//! caching, no retries. Adapters translate transport failures into
//! [`UsersRepositoryError`] and services map those into the domain
//! [`Error`].

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UsersRepositoryError {
        /// The request could not be sent or the connection dropped.
        Transport { message: String } => "users request failed: {message}",
        /// The request did not complete in time.
        Timeout { message: String } => "users request timed out: {message}",
        /// The directory answered with a non-success status.
        Status { status: u16, message: String } =>
            "users request returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "users response could not be decoded: {message}",
    }
}

impl From<UsersRepositoryError> for Error {
    fn from(error: UsersRepositoryError) -> Self {
        let message = error.to_string();
        match error {
            UsersRepositoryError::Transport { .. } | UsersRepositoryError::Timeout { .. } => {
                Self::network(message)
            }
            UsersRepositoryError::Status { status, .. } => Self::http(status, message),
            UsersRepositoryError::Decode { .. } => Self::internal(message),
        }
    }
}

/// One page of the directory plus the server-side filters to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    /// Page number and size.
    pub request: PageRequest,
    /// Case-insensitive substring matched against names.
    pub search: Option<String>,
    /// Exact company name.
    pub company: Option<String>,
}

impl UserListQuery {
    /// Unfiltered query for one page.
    pub fn new(request: PageRequest) -> Self {
        Self {
            request,
            search: None,
            company: None,
        }
    }

    /// Whether `user` passes this query's filters.
    pub fn matches(&self, user: &User) -> bool {
        let search_matches = self.search.as_deref().is_none_or(|term| {
            user.name
                .to_lowercase()
                .contains(term.to_lowercase().as_str())
        });
        let company_matches = self
            .company
            .as_deref()
            .is_none_or(|company| user.company.name == company);
        search_matches && company_matches
    }
}

/// Port for reading and writing directory users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fetch one page of users matching the query.
    ///
    /// The page's total count is `None` when the directory did not report
    /// one.
    async fn list_page(&self, query: &UserListQuery) -> Result<Page<User>, UsersRepositoryError>;

    /// Fetch a single user.
    async fn get_by_id(&self, id: UserId) -> Result<User, UsersRepositoryError>;

    /// Create a user; the directory assigns the id.
    async fn create(&self, user: &NewUser) -> Result<User, UsersRepositoryError>;

    /// Replace a user's fields.
    async fn update(&self, id: UserId, user: &NewUser) -> Result<User, UsersRepositoryError>;

    /// Delete a user.
    async fn delete(&self, id: UserId) -> Result<(), UsersRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Company, ErrorCode};
    use rstest::rstest;

    fn user(name: &str, company: &str) -> User {
        User {
            id: UserId::new(1),
            name: name.to_owned(),
            username: name.to_owned(),
            email: "someone@example.com".to_owned(),
            phone: "1".to_owned(),
            website: "example.com".to_owned(),
            address: Address::default(),
            company: Company::named(company),
        }
    }

    fn query(search: Option<&str>, company: Option<&str>) -> UserListQuery {
        UserListQuery {
            search: search.map(str::to_owned),
            company: company.map(str::to_owned),
            ..UserListQuery::new(PageRequest::first(8).expect("request"))
        }
    }

    #[rstest]
    #[case::unfiltered(None, None, true)]
    #[case::case_insensitive_search(Some("LOVE"), None, true)]
    #[case::search_miss(Some("babbage"), None, false)]
    #[case::company_hit(None, Some("Engines"), true)]
    #[case::company_is_exact(None, Some("engines"), false)]
    #[case::both(Some("ada"), Some("Engines"), true)]
    fn query_filters_match_users(
        #[case] search: Option<&str>,
        #[case] company: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(
            query(search, company).matches(&user("Ada Lovelace", "Engines")),
            expected
        );
    }

    #[rstest]
    #[case::transport(UsersRepositoryError::transport("reset"), ErrorCode::Network, None)]
    #[case::timeout(UsersRepositoryError::timeout("slow"), ErrorCode::Network, None)]
    #[case::status(UsersRepositoryError::status(500_u16, "boom"), ErrorCode::Http, Some(500))]
    #[case::decode(UsersRepositoryError::decode("bad json"), ErrorCode::Internal, None)]
    fn repository_errors_map_to_domain_codes(
        #[case] error: UsersRepositoryError,
        #[case] code: ErrorCode,
        #[case] status: Option<u16>,
    ) {
        let mapped = Error::from(error);
        assert_eq!(mapped.code(), code);
        assert_eq!(mapped.status(), status);
    }
}
