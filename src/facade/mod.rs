mod book;

pub use book::{ExportFile, ImportReport, PolicyBook};
