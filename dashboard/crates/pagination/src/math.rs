//! Page arithmetic shared by page envelopes and navigation.

/// Number of pages needed to show `total_count` items, `page_size` at a time.
///
/// An empty result set spans zero pages. A zero page size also yields zero
/// pages rather than dividing by zero.
///
/// # Examples
///
/// ```
/// use pagination::total_pages;
///
/// assert_eq!(total_pages(10, 8), 2);
/// assert_eq!(total_pages(16, 8), 2);
/// assert_eq!(total_pages(0, 8), 0);
/// ```
#[must_use]
pub const fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64)
}

/// Clamp a requested page number into `[1, total_pages]`.
///
/// The lower bound wins when `total_pages` is zero, so navigation always
/// lands on page 1 for an empty result set.
///
/// # Examples
///
/// ```
/// use pagination::clamp_page;
///
/// assert_eq!(clamp_page(7, 3), 3);
/// assert_eq!(clamp_page(0, 3), 1);
/// assert_eq!(clamp_page(4, 0), 1);
/// ```
#[must_use]
pub fn clamp_page(requested: u64, total_pages: u64) -> u64 {
    requested.min(total_pages).max(1)
}
