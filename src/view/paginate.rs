use std::ops::{Range, RangeInclusive};

/// Page numbers shown either side of the current one by a pager control.
pub const PAGE_WINDOW_RADIUS: usize = 2;

/// Everything a pagination control needs without recounting.
///
/// `first_visible_index` and `last_visible_index` are 1-based positions in
/// the filtered list ("showing 11-20 of 23"); both are 0 when it is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub first_visible_index: usize,
    pub last_visible_index: usize,
}

impl PageMeta {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Up to [`PAGE_WINDOW_RADIUS`] page numbers either side of the current
    /// page, never past the first or last page.
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        let start = self.page.saturating_sub(PAGE_WINDOW_RADIUS).max(1);
        let end = (self.page + PAGE_WINDOW_RADIUS).min(self.total_pages);
        start..=end
    }
}

/// `ceil(count / page_size)`; zero for an empty list.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamps a requested page into `[1, max(1, total_pages)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice bounds and metadata for `page` of a `count`-long list. Out-of-range
/// pages are clamped, never wrapped.
pub fn window(count: usize, page: usize, page_size: usize) -> (Range<usize>, PageMeta) {
    let page_size = page_size.max(1);
    let total_pages = total_pages(count, page_size);
    let page = clamp_page(page, total_pages);

    let start = ((page - 1) * page_size).min(count);
    let end = (page * page_size).min(count);

    let meta = PageMeta {
        page,
        page_size,
        total_filtered: count,
        total_pages,
        first_visible_index: if count == 0 { 0 } else { start + 1 },
        last_visible_index: end,
    };
    (start..end, meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_rows_by_ten() {
        let (range, meta) = window(23, 1, 10);
        assert_eq!(range, 0..10);
        assert_eq!(meta.total_pages, 3);

        let (range, meta) = window(23, 3, 10);
        assert_eq!(range, 20..23);
        assert_eq!((meta.first_visible_index, meta.last_visible_index), (21, 23));

        let (range, meta) = window(23, 4, 10);
        assert_eq!(meta.page, 3);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn test_empty_list() {
        let (range, meta) = window(0, 5, 10);
        assert!(range.is_empty());
        assert_eq!(meta.page, 1);
        assert_eq!(meta.total_pages, 0);
        assert_eq!((meta.first_visible_index, meta.last_visible_index), (0, 0));
        assert!(!meta.has_next());
        assert!(!meta.has_previous());
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let (_, meta) = window(5, 0, 2);
        assert_eq!(meta.page, 1);
    }

    #[test]
    fn test_page_number_window() {
        let (_, meta) = window(100, 5, 10);
        assert_eq!(meta.page_numbers(), 3..=7);
        let (_, meta) = window(100, 1, 10);
        assert_eq!(meta.page_numbers(), 1..=3);
        let (_, meta) = window(100, 10, 10);
        assert_eq!(meta.page_numbers(), 8..=10);
    }
}
