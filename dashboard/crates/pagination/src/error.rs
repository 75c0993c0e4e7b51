//! Error types for page requests and envelopes.

use thiserror::Error;

/// Errors raised when constructing page requests or page envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers are 1-based.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// Page size is zero.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// Page size exceeds the supported maximum.
    #[error("page size must be at most {max}, got {actual}")]
    PageSizeTooLarge {
        /// Largest accepted page size.
        max: u32,
        /// Requested page size.
        actual: u32,
    },
    /// A page holds more items than its page size allows.
    #[error("page holds {actual} items but the page size is {page_size}")]
    Overfull {
        /// Configured page size.
        page_size: u32,
        /// Number of items supplied.
        actual: usize,
    },
}
