pub mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use policybook::{
    BookConfig, Format, Outcome, PolicyBook, PolicyDraft, PolicyError, RecordId, SortDirection,
    format_currency,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "policybook")]
#[command(about = "Local register of motor insurance policies")]
pub struct Cli {
    /// Directory holding the stored collection
    #[arg(long, global = true, default_value = policybook::config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Rows per page for `list`
    #[arg(long, global = true, default_value_t = policybook::view::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Log debug events to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a record from a JSON object file
    Add { file: PathBuf },
    /// Replace a record with the contents of a JSON object file
    Update { id: String, file: PathBuf },
    Delete { id: String },
    Show { id: String },
    /// Print one page of the table
    List {
        #[arg(long)]
        search: Option<String>,
        /// Field key to sort by, e.g. totalAmount
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Append records from a .json, .csv, .xlsx or .xls file
    Import { file: PathBuf },
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Target file or directory (default: dated name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Stats,
    /// Delete every record
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl From<ExportFormat> for Format {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Csv => Format::Csv,
            ExportFormat::Json => Format::Json,
            ExportFormat::Xlsx => Format::Xlsx,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = BookConfig::new(&cli.data_dir).page_size(cli.page_size);
    let mut book = report(PolicyBook::open(config));

    match cli.command {
        Command::Add { file } => {
            let draft = read_draft(&file)?;
            let record = report(book.create(draft)?);
            println!("Added {}", record.id());
        }
        Command::Update { id, file } => {
            let draft = read_draft(&file)?;
            let record = report(book.update(&RecordId::from(id), draft)?);
            println!(
                "Updated {} (total {})",
                record.id(),
                format_currency(record.total_amount())
            );
        }
        Command::Delete { id } => {
            let removed = report(book.delete(&RecordId::from(id))?);
            println!("Deleted {} ({})", removed.id(), removed.vehicle().plate);
        }
        Command::Show { id } => {
            let id = RecordId::from(id);
            let record = book.get(&id).ok_or(PolicyError::NotFound(id))?;
            print!("{}", render::record_details(record));
        }
        Command::List {
            search,
            sort,
            desc,
            page,
        } => {
            if let Some(term) = search {
                book.search(&term);
            }
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                book.set_sort(&column, direction);
            }
            book.go_to_page(page);
            print!("{}", render::page(&book.current_page()));
        }
        Command::Import { file } => {
            let outcome = book
                .import_file(&file)
                .with_context(|| format!("Failed to import '{}'", file.display()))?;
            let import = report(outcome);
            println!(
                "Imported {} of {} row(s) from {} ({} skipped)",
                import.imported.len(),
                import.rows_read,
                file.display(),
                import.skipped
            );
        }
        Command::Export { format, out } => {
            let export = book.export_today(format.into())?;
            let target = export_target(out, &export.file_name);
            ensure_parent_dir(&target)?;
            fs::write(&target, &export.bytes)
                .with_context(|| format!("Failed to write export to '{}'", target.display()))?;
            println!("Exported {} record(s) to {}", book.len(), target.display());
        }
        Command::Stats => {
            let stats = book.stats();
            println!("Records: {}", stats.record_count);
            println!("Total:   {}", format_currency(stats.total_amount));
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("Refusing to delete every record without --yes");
            }
            let removed = report(book.clear_all());
            println!("Deleted {} record(s)", removed);
        }
    }
    Ok(())
}

/// Prints non-fatal warnings to stderr and hands back the value.
fn report<T>(outcome: Outcome<T>) -> T {
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    outcome.into_value()
}

fn read_draft(path: &Path) -> Result<PolicyDraft> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;
    PolicyDraft::from_json(value).with_context(|| format!("Invalid record in '{}'", path.display()))
}

fn export_target(out: Option<PathBuf>, file_name: &str) -> PathBuf {
    match out {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path,
        None => PathBuf::from(file_name),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory '{}'", parent.display()))?;
    }
    Ok(())
}
