//! Filter, sort and page state for the users table.
//!
//! The canonical copy lives in a [`QueryState`] (the shareable URL); the
//! [`ViewStateStore`] derives a typed [`ViewState`] from it, writes every
//! change back as one batch, and broadcasts snapshots over a
//! [`tokio::sync::watch`] channel.
//!
//! Parameter mapping: `page`, `search`, `company`, `sort`. Default values
//! (page 1, empty search, all companies, ascending) are written by removing
//! the parameter.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use pagination::{PageRequest, PaginationError, clamp_page};
use tokio::sync::watch;
use tracing::debug;

use super::Error;
use super::page_key::PageKey;
use super::ports::{QueryState, QueryUpdate};

pub const PAGE_QUERY_PARAM: &str = "page";
pub const SEARCH_QUERY_PARAM: &str = "search";
pub const COMPANY_QUERY_PARAM: &str = "company";
pub const SORT_QUERY_PARAM: &str = "sort";

/// Query value selecting every company.
pub const ALL_COMPANIES: &str = "all";

/// Email sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`SortOrder`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sort order must be 'asc' or 'desc', got '{0}'")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortOrderError(value.to_owned())),
        }
    }
}

/// Company filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CompanySelection {
    #[default]
    All,
    Named(String),
}

impl CompanySelection {
    /// Parse a query value; blank and `"all"` select every company.
    pub fn from_query_value(value: &str) -> Self {
        if value.is_empty() || value == ALL_COMPANIES {
            Self::All
        } else {
            Self::Named(value.to_owned())
        }
    }

    /// The selected company name, if one is selected.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name.as_str()),
        }
    }

    /// Query value for this selection.
    pub fn as_query_value(&self) -> &str {
        self.name().unwrap_or(ALL_COMPANIES)
    }
}

impl From<Option<&str>> for CompanySelection {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::All, Self::from_query_value)
    }
}

/// Snapshot of the table's filter, sort and page state.
///
/// ## Invariants
/// - `page >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: u32,
    pub search: String,
    pub company: CompanySelection,
    pub sort: SortOrder,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            company: CompanySelection::All,
            sort: SortOrder::Asc,
        }
    }
}

impl ViewState {
    /// Read the state from query parameters.
    ///
    /// Unparsable or zero `page` values read as 1; unknown `sort` values
    /// read as ascending.
    pub fn from_query(query: &dyn QueryState) -> Self {
        let page = query
            .get(PAGE_QUERY_PARAM)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        let sort = query
            .get(SORT_QUERY_PARAM)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        Self {
            page,
            search: query.get(SEARCH_QUERY_PARAM).unwrap_or_default(),
            company: CompanySelection::from(query.get(COMPANY_QUERY_PARAM).as_deref()),
            sort,
        }
    }

    /// Query updates that write this state, removing defaulted parameters.
    pub fn to_query_updates(&self) -> Vec<QueryUpdate> {
        let page = if self.page > 1 {
            QueryUpdate::set(PAGE_QUERY_PARAM, self.page.to_string())
        } else {
            QueryUpdate::remove(PAGE_QUERY_PARAM)
        };
        let search = if self.search.is_empty() {
            QueryUpdate::remove(SEARCH_QUERY_PARAM)
        } else {
            QueryUpdate::set(SEARCH_QUERY_PARAM, self.search.as_str())
        };
        let company = match &self.company {
            CompanySelection::All => QueryUpdate::remove(COMPANY_QUERY_PARAM),
            CompanySelection::Named(name) => QueryUpdate::set(COMPANY_QUERY_PARAM, name.as_str()),
        };
        let sort = match self.sort {
            SortOrder::Asc => QueryUpdate::remove(SORT_QUERY_PARAM),
            SortOrder::Desc => QueryUpdate::set(SORT_QUERY_PARAM, SortOrder::Desc.as_str()),
        };
        vec![page, search, company, sort]
    }

    /// Cache key for the page this state shows.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when `page_size` is out of range.
    pub fn page_key(&self, page_size: u32) -> Result<PageKey, PaginationError> {
        let request = PageRequest::new(self.page.max(1), page_size)?;
        Ok(PageKey::new(request, self.search.as_str(), self.company.clone()))
    }
}

/// Observable store deriving [`ViewState`] from a [`QueryState`].
pub struct ViewStateStore<Q> {
    query: Arc<Q>,
    sender: watch::Sender<ViewState>,
    write_lock: Mutex<()>,
}

impl<Q: QueryState> ViewStateStore<Q> {
    /// Initialise from the current query parameters.
    pub fn new(query: Arc<Q>) -> Self {
        let initial = ViewState::from_query(query.as_ref());
        let (sender, _receiver) = watch::channel(initial);
        Self {
            query,
            sender,
            write_lock: Mutex::new(()),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }

    /// Change the search term and return to page 1.
    pub fn set_search(&self, term: impl Into<String>) -> Result<ViewState, Error> {
        let search = term.into();
        self.update(move |state| ViewState {
            page: 1,
            search,
            ..state.clone()
        })
    }

    /// Change the company filter and return to page 1.
    pub fn set_company(&self, company: CompanySelection) -> Result<ViewState, Error> {
        self.update(move |state| ViewState {
            page: 1,
            company,
            ..state.clone()
        })
    }

    /// Change the email sort order. The page is kept.
    pub fn set_sort(&self, sort: SortOrder) -> Result<ViewState, Error> {
        self.update(move |state| ViewState {
            sort,
            ..state.clone()
        })
    }

    /// Flip the email sort order. The page is kept.
    pub fn toggle_sort(&self) -> Result<ViewState, Error> {
        self.update(|state| ViewState {
            sort: state.sort.toggled(),
            ..state.clone()
        })
    }

    /// Move to `page`, clamped to `[1, total_pages]`.
    ///
    /// `total_pages` of zero is treated as one.
    pub fn set_page(&self, page: u32, total_pages: u64) -> Result<ViewState, Error> {
        let clamped = clamp_page(u64::from(page), total_pages.max(1));
        let page = u32::try_from(clamped).unwrap_or(u32::MAX);
        self.update(move |state| ViewState {
            page,
            ..state.clone()
        })
    }

    /// Reset search, company and page. The sort order is kept.
    pub fn clear_filters(&self) -> Result<ViewState, Error> {
        self.update(|state| ViewState {
            sort: state.sort,
            ..ViewState::default()
        })
    }

    /// Re-read the query parameters after an external change (for example
    /// back/forward navigation).
    pub fn reload(&self) -> ViewState {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let next = ViewState::from_query(self.query.as_ref());
        self.publish(next.clone());
        next
    }

    fn update(&self, transition: impl FnOnce(&ViewState) -> ViewState) -> Result<ViewState, Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let next = transition(&self.sender.borrow());
        self.query
            .apply(&next.to_query_updates())
            .map_err(|error| Error::internal(format!("failed to update view state: {error}")))?;
        self.publish(next.clone());
        Ok(next)
    }

    fn publish(&self, next: ViewState) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            let state = self.sender.borrow();
            debug!(
                page = state.page,
                search = %state.search,
                company = state.company.as_query_value(),
                sort = %state.sort,
                "view state changed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for view state derivation and transitions.
    use super::*;
    use crate::domain::ports::{MockQueryState, QueryStateError};
    use crate::outbound::query_state::UrlQueryState;
    use rstest::{fixture, rstest};
    use url::Url;

    fn url_state(raw: &str) -> Arc<UrlQueryState> {
        Arc::new(UrlQueryState::new(Url::parse(raw).expect("url")))
    }

    #[fixture]
    fn store() -> ViewStateStore<UrlQueryState> {
        ViewStateStore::new(url_state("http://localhost/"))
    }

    #[rstest]
    #[case::defaults("http://localhost/", ViewState::default())]
    #[case::all_params(
        "http://localhost/?page=3&search=ada&company=Acme&sort=desc",
        ViewState {
            page: 3,
            search: "ada".to_owned(),
            company: CompanySelection::Named("Acme".to_owned()),
            sort: SortOrder::Desc,
        }
    )]
    #[case::garbage_page("http://localhost/?page=abc&sort=sideways", ViewState::default())]
    #[case::zero_page("http://localhost/?page=0&company=all", ViewState::default())]
    fn reads_state_from_query(#[case] raw: &str, #[case] expected: ViewState) {
        let query = url_state(raw);
        assert_eq!(ViewState::from_query(query.as_ref()), expected);
    }

    #[rstest]
    fn search_resets_page(store: ViewStateStore<UrlQueryState>) {
        store.set_page(4, 10).expect("page");
        let state = store.set_search("lee").expect("search");
        assert_eq!(state.page, 1);
        assert_eq!(state.search, "lee");
    }

    #[rstest]
    fn company_resets_page(store: ViewStateStore<UrlQueryState>) {
        store.set_page(2, 3).expect("page");
        let state = store
            .set_company(CompanySelection::Named("Acme".to_owned()))
            .expect("company");
        assert_eq!(state.page, 1);
        assert_eq!(state.company.name(), Some("Acme"));
    }

    #[rstest]
    fn sort_keeps_page(store: ViewStateStore<UrlQueryState>) {
        store.set_page(2, 3).expect("page");
        let state = store.toggle_sort().expect("toggle");
        assert_eq!(state.page, 2);
        assert_eq!(state.sort, SortOrder::Desc);
        assert_eq!(store.toggle_sort().expect("toggle").sort, SortOrder::Asc);
    }

    #[rstest]
    #[case::within(2, 3, 2)]
    #[case::beyond(9, 3, 3)]
    #[case::zero(0, 3, 1)]
    #[case::no_pages(5, 0, 1)]
    fn set_page_clamps(
        store: ViewStateStore<UrlQueryState>,
        #[case] requested: u32,
        #[case] total_pages: u64,
        #[case] expected: u32,
    ) {
        assert_eq!(store.set_page(requested, total_pages).expect("page").page, expected);
    }

    #[rstest]
    fn defaults_are_written_by_removal() {
        let query = url_state("http://localhost/users?page=2&search=x&sort=desc");
        let store = ViewStateStore::new(Arc::clone(&query));
        store.clear_filters().expect("clear");
        store.set_sort(SortOrder::Asc).expect("sort");
        assert_eq!(query.current().query(), None);
    }

    #[rstest]
    fn clear_filters_keeps_sort() {
        let query = url_state("http://localhost/?page=2&search=x&company=Acme&sort=desc");
        let store = ViewStateStore::new(Arc::clone(&query));
        let state = store.clear_filters().expect("clear");
        assert_eq!(
            state,
            ViewState {
                sort: SortOrder::Desc,
                ..ViewState::default()
            }
        );
        assert_eq!(query.current().query(), Some("sort=desc"));
    }

    #[rstest]
    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = ViewStateStore::new(url_state("http://localhost/"));
        let mut receiver = store.subscribe();
        store.set_search("ada").expect("search");
        receiver.changed().await.expect("changed");
        assert_eq!(receiver.borrow_and_update().search, "ada");
    }

    #[rstest]
    fn reload_picks_up_external_navigation() {
        let query = url_state("http://localhost/");
        let store = ViewStateStore::new(Arc::clone(&query));
        query
            .apply(&[QueryUpdate::set(PAGE_QUERY_PARAM, "5")])
            .expect("apply");
        assert_eq!(store.reload().page, 5);
        assert_eq!(store.snapshot().page, 5);
    }

    #[rstest]
    fn failed_write_leaves_state_untouched() {
        let mut query = MockQueryState::new();
        query.expect_get().returning(|_| None);
        query
            .expect_apply()
            .times(1)
            .return_once(|_| Err(QueryStateError::unavailable("read-only")));
        let store = ViewStateStore::new(Arc::new(query));

        let err = store.set_search("ada").expect_err("write fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::Internal);
        assert_eq!(store.snapshot(), ViewState::default());
    }

    #[rstest]
    fn page_key_reflects_state() {
        let state = ViewState {
            page: 2,
            search: "ada".to_owned(),
            ..ViewState::default()
        };
        let key = state.page_key(8).expect("key");
        assert_eq!(key.request().page(), 2);
        assert_eq!(key.search(), "ada");
    }
}
