//! Cache key identifying one page/filter combination.

use std::fmt;

use pagination::PageRequest;
use sha2::{Digest, Sha256};

use super::User;
use super::ports::UserListQuery;
use super::view_state::CompanySelection;

const FINGERPRINT_PREFIX: &str = "users:v1:";

/// Structured cache key: page, page size, search term and company filter.
///
/// Keys compare structurally; [`PageKey::fingerprint`] gives the stable
/// hashed string form used in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    request: PageRequest,
    search: String,
    company: CompanySelection,
}

impl PageKey {
    pub fn new(request: PageRequest, search: impl Into<String>, company: CompanySelection) -> Self {
        Self {
            request,
            search: search.into(),
            company,
        }
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn search(&self) -> &str {
        self.search.as_str()
    }

    pub fn company(&self) -> &CompanySelection {
        &self.company
    }

    /// Whether this key addresses the first page of its filter.
    pub fn is_first_page(&self) -> bool {
        self.request.page() == 1
    }

    /// Whether both keys share search term, company filter and page size.
    pub fn same_filters(&self, other: &Self) -> bool {
        self.search == other.search
            && self.company == other.company
            && self.request.page_size() == other.request.page_size()
    }

    /// Whether `user` passes this key's filters.
    pub fn matches(&self, user: &User) -> bool {
        self.query().matches(user)
    }

    /// Repository query for this key.
    pub fn query(&self) -> UserListQuery {
        UserListQuery {
            request: self.request,
            search: Some(self.search.clone()).filter(|term| !term.is_empty()),
            company: self.company.name().map(str::to_owned),
        }
    }

    /// Stable hashed form: `users:v1:<sha256 hex>`.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::{CompanySelection, PageKey};
    /// use pagination::PageRequest;
    ///
    /// let key = PageKey::new(PageRequest::first(8).expect("request"), "", CompanySelection::All);
    /// assert!(key.fingerprint().starts_with("users:v1:"));
    /// assert_eq!(key.fingerprint().len(), "users:v1:".len() + 64);
    /// ```
    pub fn fingerprint(&self) -> String {
        let company = self.company.as_query_value();
        // Length prefixes keep distinct tuples from colliding on separators.
        let canonical = format!(
            "{}|{}|{}:{}|{}:{}",
            self.request.page(),
            self.request.page_size(),
            self.search.len(),
            self.search,
            company.len(),
            company,
        );
        let digest = Sha256::digest(canonical.as_bytes());
        format!("{FINGERPRINT_PREFIX}{}", hex::encode(digest))
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(page: u32, search: &str, company: CompanySelection) -> PageKey {
        PageKey::new(PageRequest::new(page, 8).expect("request"), search, company)
    }

    #[rstest]
    fn fingerprint_is_stable() {
        let first = key(1, "ada", CompanySelection::All);
        let second = key(1, "ada", CompanySelection::All);
        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[rstest]
    #[case::page(key(2, "ada", CompanySelection::All))]
    #[case::search(key(1, "bob", CompanySelection::All))]
    #[case::company(key(1, "ada", CompanySelection::Named("Acme".to_owned())))]
    #[case::separator_shift(key(1, "ada|3", CompanySelection::All))]
    fn fingerprint_differs_per_component(#[case] other: PageKey) {
        let base = key(1, "ada", CompanySelection::All);
        assert_ne!(base.fingerprint(), other.fingerprint());
    }

    #[rstest]
    fn query_drops_empty_filters() {
        let query = key(3, "", CompanySelection::All).query();
        assert_eq!(query.search, None);
        assert_eq!(query.company, None);
        assert_eq!(query.request.page(), 3);
    }

    #[rstest]
    fn same_filters_ignores_page() {
        let first = key(1, "ada", CompanySelection::All);
        assert!(first.same_filters(&key(4, "ada", CompanySelection::All)));
        assert!(!first.same_filters(&key(1, "", CompanySelection::All)));
        assert!(first.is_first_page());
    }
}
