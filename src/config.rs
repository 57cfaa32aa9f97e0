use crate::view::DEFAULT_PAGE_SIZE;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = ".policybook";
pub const DEFAULT_STORAGE_KEY: &str = "insuranceData";

/// Policy book configuration
///
/// Builder style: start from `BookConfig::default()` or `BookConfig::new(dir)`
/// and chain setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// Directory holding the stored collection
    pub data_dir: PathBuf,

    /// Key the collection is stored under (file stem inside `data_dir`)
    pub storage_key: String,

    /// Rows per view page, at least 1
    pub page_size: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl BookConfig {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the storage key
    pub fn storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    /// Set the page size (0 is treated as 1)
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Path of the file the collection is stored in
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }
}
