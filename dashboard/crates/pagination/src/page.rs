//! Page envelope holding one slice of a result set.

use serde::Serialize;

use crate::{PageRequest, PaginationError, total_pages};

/// One fetched slice of a result set plus the total-count signal.
///
/// ## Invariants
/// - `items.len() <= page_size`; every mutator preserves this by evicting
///   from the tail.
/// - `total_count` is `None` when the backend did not report one. In that
///   case [`Page::total_pages`] reports a single page and
///   [`Page::has_next`] falls back to "a full page was returned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total_count: Option<u64>,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Build a page envelope.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::Overfull`] when `items` holds more entries
    /// than the request's page size.
    pub fn new(
        items: Vec<T>,
        request: PageRequest,
        total_count: Option<u64>,
    ) -> Result<Self, PaginationError> {
        if items.len() > request.page_size() as usize {
            return Err(PaginationError::Overfull {
                page_size: request.page_size(),
                actual: items.len(),
            });
        }
        Ok(Self {
            items,
            total_count,
            request,
        })
    }

    /// Items on this page in backend order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the envelope and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The request this page answers.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.request.page()
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.request.page_size()
    }

    /// Total size of the result set, when the backend reported it.
    #[must_use]
    pub const fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Number of pages in the result set.
    ///
    /// Unknown totals count as a single page.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        match self.total_count {
            Some(total) => total_pages(total, self.request.page_size()),
            None => 1,
        }
    }

    /// Whether the page holds as many items as it can.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.request.page_size() as usize
    }

    /// Whether another page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        match self.total_count {
            Some(_) => u64::from(self.page()) < self.total_pages(),
            None => self.is_full(),
        }
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.request.page() > 1
    }

    /// Index of the first item matching `predicate`.
    pub fn position(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    /// Insert at `index` (clamped to the current length).
    ///
    /// Returns the tail item evicted to keep the page within its size.
    pub fn insert_at(&mut self, index: usize, item: T) -> Option<T> {
        let at = index.min(self.items.len());
        self.items.insert(at, item);
        if self.items.len() > self.request.page_size() as usize {
            self.items.pop()
        } else {
            None
        }
    }

    /// Insert at the front, evicting the tail item when the page is full.
    pub fn insert_front(&mut self, item: T) -> Option<T> {
        self.insert_at(0, item)
    }

    /// Append at the back when there is room. Returns `false` when full.
    pub fn push_back(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Replace the first item matching `predicate`, returning the old one.
    pub fn replace_where(&mut self, predicate: impl FnMut(&T) -> bool, item: T) -> Option<T> {
        let index = self.items.iter().position(predicate)?;
        self.items.get_mut(index).map(|slot| std::mem::replace(slot, item))
    }

    /// Remove the first item matching `predicate`, returning its index and value.
    pub fn remove_where(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<(usize, T)> {
        let index = self.items.iter().position(predicate)?;
        Some((index, self.items.remove(index)))
    }

    /// Raise the reported total by one. Unknown totals stay unknown.
    pub fn increment_total(&mut self) {
        if let Some(total) = self.total_count.as_mut() {
            *total = total.saturating_add(1);
        }
    }

    /// Lower the reported total by one, never below zero.
    pub fn decrement_total(&mut self) {
        if let Some(total) = self.total_count.as_mut() {
            *total = total.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page envelope behaviour.
    use super::*;
    use rstest::{fixture, rstest};

    fn request(page: u32, size: u32) -> PageRequest {
        PageRequest::new(page, size).expect("valid request")
    }

    #[fixture]
    fn full_page() -> Page<u32> {
        Page::new(vec![1, 2, 3], request(1, 3), Some(7)).expect("page fits")
    }

    #[rstest]
    fn rejects_overfull_pages() {
        let err = Page::new(vec![1, 2, 3], request(1, 2), Some(3)).expect_err("overfull");
        assert_eq!(
            err,
            PaginationError::Overfull {
                page_size: 2,
                actual: 3
            }
        );
    }

    #[rstest]
    fn ten_items_at_eight_per_page_span_two_pages() {
        let second = Page::new(vec![9, 10], request(2, 8), Some(10)).expect("page fits");
        assert_eq!(second.total_pages(), 2);
        assert_eq!(second.items().len(), 2);
        assert!(!second.has_next());
        assert!(second.has_previous());
    }

    #[rstest]
    fn empty_result_set_has_no_pages() {
        let page: Page<u32> = Page::new(Vec::new(), request(1, 8), Some(0)).expect("empty");
        assert_eq!(page.total_pages(), 0);
        assert!(page.items().is_empty());
        assert!(!page.has_next());
    }

    #[rstest]
    #[case::full(vec![1, 2, 3], true)]
    #[case::partial(vec![1, 2], false)]
    fn unknown_total_uses_full_page_heuristic(#[case] items: Vec<u32>, #[case] next: bool) {
        let page = Page::new(items, request(1, 3), None).expect("page fits");
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.has_next(), next);
    }

    #[rstest]
    fn insert_front_evicts_tail_of_full_page(mut full_page: Page<u32>) {
        let evicted = full_page.insert_front(0);
        assert_eq!(evicted, Some(3));
        assert_eq!(full_page.items(), &[0, 1, 2]);
    }

    #[rstest]
    fn insert_at_clamps_index() {
        let mut page = Page::new(vec![1], request(1, 3), Some(1)).expect("page fits");
        assert_eq!(page.insert_at(10, 2), None);
        assert_eq!(page.items(), &[1, 2]);
    }

    #[rstest]
    fn push_back_refuses_when_full(mut full_page: Page<u32>) {
        assert!(!full_page.push_back(4));
        assert_eq!(full_page.items(), &[1, 2, 3]);
    }

    #[rstest]
    fn remove_and_replace_report_previous_values(mut full_page: Page<u32>) {
        assert_eq!(full_page.remove_where(|item| *item == 2), Some((1, 2)));
        assert_eq!(full_page.replace_where(|item| *item == 3, 30), Some(3));
        assert_eq!(full_page.items(), &[1, 30]);
        assert_eq!(full_page.remove_where(|item| *item == 99), None);
    }

    #[rstest]
    fn totals_saturate_at_zero() {
        let mut page: Page<u32> = Page::new(Vec::new(), request(1, 3), Some(0)).expect("empty");
        page.decrement_total();
        assert_eq!(page.total_count(), Some(0));
        page.increment_total();
        assert_eq!(page.total_count(), Some(1));
    }

    #[rstest]
    fn unknown_totals_are_not_invented() {
        let mut page: Page<u32> = Page::new(Vec::new(), request(1, 3), None).expect("empty");
        page.increment_total();
        assert_eq!(page.total_count(), None);
    }
}
