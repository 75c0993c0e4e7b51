//! Offset pagination primitives for the dashboard data layer.
//!
//! The crate keeps page arithmetic in one place so every caller agrees on
//! how many pages a result set spans, which page numbers are reachable, and
//! how a page request is encoded on the wire.
//!
//! Public surface:
//! - [`PageRequest`]: validated 1-based page number and page size.
//! - [`Page`]: one fetched slice plus the total-count signal.
//! - [`total_pages`] and [`clamp_page`]: page arithmetic helpers.
//!
//! # Example
//!
//! ```
//! use pagination::{Page, PageRequest, total_pages};
//!
//! let request = PageRequest::new(2, 8).expect("valid request");
//! let page = Page::new(vec!["ninth", "tenth"], request, Some(10)).expect("fits");
//!
//! assert_eq!(total_pages(10, 8), 2);
//! assert_eq!(page.total_pages(), 2);
//! assert!(!page.has_next());
//! ```

mod error;
mod math;
mod page;
mod request;

pub use error::PaginationError;
pub use math::{clamp_page, total_pages};
pub use page::Page;
pub use request::{DEFAULT_PAGE_SIZE, LIMIT_PARAM, MAX_PAGE_SIZE, PAGE_PARAM, PageRequest};
