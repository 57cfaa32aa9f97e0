// ============================================================================
// PolicyBook Library
// ============================================================================

//! Local register of motor insurance policies: a record store persisted as
//! one JSON blob, a searchable/sortable/paginated view over it, and import /
//! export through labelled JSON, CSV and spreadsheet tables.
//!
//! ```no_run
//! use policybook::{BookConfig, PolicyBook, Format};
//!
//! let mut book = PolicyBook::open(BookConfig::default()).into_value();
//! book.search("toyota");
//! for record in book.current_page().rows {
//!     println!("{} {}", record.vehicle().plate, record.total_amount());
//! }
//! let file = book.export_today(Format::Csv)?;
//! std::fs::write(&file.file_name, &file.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod display;
pub mod facade;
pub mod mapper;
pub mod storage;
pub mod store;
pub mod view;

pub use codec::{Format, RowCodec};
pub use config::BookConfig;
pub use core::{
    CoverageLine, Customer, DocumentAddress, EXPORT_FIELDS, Field, FieldKind, FieldValue,
    InstallmentMonths, InsuranceType, Outcome, PaymentPlan, Policy, PolicyDraft, PolicyError,
    PolicyRecord, RecordId, Result, UseType, Vehicle,
};
pub use display::{format_currency, format_date};
pub use facade::{ExportFile, ImportReport, PolicyBook};
pub use storage::{BlobStore, FileBlobStore, JsonGateway, MemoryBlobStore, PersistenceGateway};
pub use store::{RecordStore, StoreStats};
pub use view::{PageMeta, SortDirection, SortKey, ViewPage, ViewPipeline, ViewState};
