//! Translation between records and labelled interchange rows.
//!
//! Export lays each record out under the fixed Thai column labels; import
//! reads rows keyed by those labels (or by the persisted keys) back into
//! drafts, filling defaults for anything missing.

pub mod export;
pub mod import;
pub mod table;

pub use export::{to_row, to_table};
pub use import::{ColumnNaming, from_table};
pub use table::{Cell, Table};
