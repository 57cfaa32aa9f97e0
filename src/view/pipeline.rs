// ============================================================================
// src/view/pipeline.rs - Derived table view
// ============================================================================
//
// all records -> filter(search) -> sort(key) -> paginate(page, size)
//
// The view never owns records. It holds only the user's view choices and
// derives the visible page from whatever slice the store hands it, so a
// page can never go stale against the collection.
//
// ============================================================================

use super::filter::SearchFilter;
use super::paginate::{self, PageMeta};
use super::sort::{SortDirection, SortExecutor, SortKey};
use crate::core::PolicyRecord;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The user's view choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: SearchFilter,
    pub sort: Option<SortKey>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: SearchFilter::default(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One derived page: the visible rows in display order plus pager metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage<'a> {
    pub rows: Vec<&'a PolicyRecord>,
    pub meta: PageMeta,
}

/// Filters, sorts and slices `records` without touching them.
///
/// An out-of-range `state.page` is clamped in the returned metadata.
pub fn derive<'a>(records: &'a [PolicyRecord], state: &ViewState) -> ViewPage<'a> {
    let mut rows: Vec<&PolicyRecord> = records.iter().filter(|r| state.search.matches(r)).collect();

    if let Some(key) = &state.sort {
        SortExecutor::sort(&mut rows, key);
    }

    let (range, meta) = paginate::window(rows.len(), state.page, state.page_size);
    let rows = rows.drain(range).collect();
    ViewPage { rows, meta }
}

fn filtered_count(records: &[PolicyRecord], search: &SearchFilter) -> usize {
    if search.is_empty() {
        return records.len();
    }
    records.iter().filter(|r| search.matches(r)).count()
}

/// Stateful wrapper over [`derive`] that applies the navigation rules:
/// a new search or page size goes back to page 1, a sort change keeps the
/// page, and every page change is clamped.
#[derive(Debug, Clone, Default)]
pub struct ViewPipeline {
    state: ViewState,
}

impl ViewPipeline {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: ViewState {
                page_size: page_size.max(1),
                ..ViewState::default()
            },
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page<'a>(&self, records: &'a [PolicyRecord]) -> ViewPage<'a> {
        derive(records, &self.state)
    }

    pub fn set_search(&mut self, term: &str) {
        self.state.search = SearchFilter::new(term);
        self.state.page = 1;
        debug!(term = self.state.search.term(), "search changed");
    }

    /// Sorting by the current column flips its direction; any other column
    /// starts ascending.
    pub fn sort_by(&mut self, column: &str) {
        let direction = match &self.state.sort {
            Some(current) if current.column == column => current.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.set_sort(Some(SortKey::new(column, direction)));
    }

    pub fn set_sort(&mut self, key: Option<SortKey>) {
        debug!(sort = ?key, "sort changed");
        self.state.sort = key;
    }

    /// Moves to `page`, clamped to the pages that exist for the current
    /// filter. Returns the page actually selected.
    pub fn go_to_page(&mut self, records: &[PolicyRecord], page: usize) -> usize {
        let total = paginate::total_pages(
            filtered_count(records, &self.state.search),
            self.state.page_size,
        );
        self.state.page = paginate::clamp_page(page, total);
        self.state.page
    }

    pub fn next_page(&mut self, records: &[PolicyRecord]) -> usize {
        self.go_to_page(records, self.state.page + 1)
    }

    pub fn previous_page(&mut self, records: &[PolicyRecord]) -> usize {
        self.go_to_page(records, self.state.page.saturating_sub(1))
    }

    /// Zero is treated as one.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.state.page = 1;
    }

    /// Re-clamps the current page after the collection changed underneath,
    /// e.g. when the last row of the last page was deleted.
    pub fn reconcile(&mut self, records: &[PolicyRecord]) {
        let page = self.state.page;
        if self.go_to_page(records, page) != page {
            debug!(from = page, to = self.state.page, "page clamped after mutation");
        }
    }
}
