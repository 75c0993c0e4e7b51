//! Validated offset page requests and their query-string encoding.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::PaginationError;

/// Page size used when callers do not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 8;
/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "_page";
/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "_limit";

/// A validated request for one page of a result set.
///
/// ## Invariants
/// - `page >= 1`.
/// - `1 <= page_size <= MAX_PAGE_SIZE`.
///
/// # Examples
///
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 8).expect("valid request");
/// assert_eq!(request.offset(), 16);
/// assert!(PageRequest::new(0, 8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate and build a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when the page is zero or the page size is
    /// zero or larger than [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::PageSizeTooLarge {
                max: MAX_PAGE_SIZE,
                actual: page_size,
            });
        }
        Ok(Self { page, page_size })
    }

    /// Request for the first page with the given size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when the page size is out of range.
    pub const fn first(page_size: u32) -> Result<Self, PaginationError> {
        Self::new(1, page_size)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items that precede this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Same page size, different page number.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPage`] when `page` is zero.
    pub const fn with_page(self, page: u32) -> Result<Self, PaginationError> {
        Self::new(page, self.page_size)
    }

    /// Append `_page` and `_limit` to the URL's query string.
    ///
    /// Existing query pairs are preserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::PageRequest;
    /// use url::Url;
    ///
    /// let mut url = Url::parse("http://localhost:3001/users").expect("url");
    /// PageRequest::new(2, 8).expect("request").append_to_url(&mut url);
    /// assert_eq!(url.query(), Some("_page=2&_limit=8"));
    /// ```
    pub fn append_to_url(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &self.page.to_string())
            .append_pair(LIMIT_PARAM, &self.page_size.to_string());
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageRequest {
    page: u32,
    page_size: u32,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PaginationError;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.page_size)
    }
}
