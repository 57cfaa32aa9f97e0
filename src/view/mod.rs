//! Read-only table view over the record collection: search, single-column
//! sort and fixed-size pages.

pub mod filter;
pub mod paginate;
pub mod pipeline;
pub mod sort;

pub use filter::SearchFilter;
pub use paginate::{PageMeta, PAGE_WINDOW_RADIUS};
pub use pipeline::{derive, ViewPage, ViewPipeline, ViewState, DEFAULT_PAGE_SIZE};
pub use sort::{SortDirection, SortExecutor, SortKey};
