// ============================================================================
// File codecs
// ============================================================================
//
// A codec turns file bytes into a [`Table`] and back. It knows nothing
// about records; column meaning is the mapper's business.

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::core::{PolicyError, Result};
use crate::mapper::Table;
use chrono::NaiveDate;
use std::fmt;
use std::path::Path;

pub use self::csv::CsvCodec;
pub use self::json::JsonCodec;
pub use self::xlsx::XlsxCodec;

/// Stem of exported file names; the UTC date and extension follow.
pub const EXPORT_FILE_STEM: &str = "insurance_data";

pub trait RowCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Table>;
    fn encode(&self, table: &Table) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Xlsx,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Xlsx),
            other => Err(PolicyError::CodecFailure(format!(
                "unsupported file type '.{}' (expected .json, .csv, .xlsx or .xls)",
                other
            ))),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                PolicyError::CodecFailure(format!("'{}' has no file extension", path.display()))
            })?;
        Self::from_extension(ext)
    }

    pub fn codec(self) -> &'static dyn RowCodec {
        match self {
            Self::Json => &JsonCodec,
            Self::Csv => &CsvCodec,
            Self::Xlsx => &XlsxCodec,
        }
    }

    /// `insurance_data_<YYYY-MM-DD>.<ext>`
    pub fn export_file_name(self, date: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            EXPORT_FILE_STEM,
            date.format("%Y-%m-%d"),
            self.extension()
        )
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Leading UTF-8 byte-order mark, as written by spreadsheet tools.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map_err(|e| PolicyError::CodecFailure(format!("file is not valid UTF-8: {}", e)))
}
