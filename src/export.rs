use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::config::Settings;
use crate::error::AppError;
use crate::layout::{self, RenderSummary};
use crate::model::BillRecord;
use crate::pdf::PdfCanvas;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Directory(PathBuf),
    /// Native save dialog, pre-filled with the generated file name.
    Dialog,
}

/// `Invoice_<number without its '#'>_<customer name, spaces as '_'>.pdf`
pub fn export_file_name(record: &BillRecord) -> String {
    let number = record.invoice_number.replacen('#', "", 1);
    let customer = WHITESPACE_RUN.replace_all(&record.customer_name, "_");
    let name = format!("Invoice_{}_{}.pdf", number, customer);
    name.replace(['/', '\\'], "_")
}

/// Reads a record from a `.json` or `.toml` file.
pub fn load_record(path: &Path) -> Result<BillRecord, AppError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let record: BillRecord = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    if record.services.is_empty() {
        return Err(AppError::InvalidRecord(format!(
            "{} has no services",
            path.display()
        )));
    }
    Ok(record.normalized())
}

/// Renders the whole document into memory.
pub fn render_pdf(record: &BillRecord, settings: &Settings) -> Result<(Vec<u8>, RenderSummary), AppError> {
    let total = record.total();
    let title = format!("Invoice {}", record.invoice_number);
    let mut canvas = PdfCanvas::new(&title)?;
    let summary = layout::render(record, total, &settings.document_style(), &mut canvas)?;
    let bytes = canvas.finish()?;
    Ok((bytes, summary))
}

/// Renders and saves the PDF. Returns `None` when the save dialog was
/// cancelled.
pub fn export_pdf(
    record: &BillRecord,
    settings: &Settings,
    destination: &Destination,
) -> Result<Option<PathBuf>, AppError> {
    let (bytes, summary) = render_pdf(record, settings)?;
    let file_name = export_file_name(record);

    let target = match destination {
        Destination::Directory(dir) => {
            fs::create_dir_all(dir)?;
            dir.join(&file_name)
        }
        Destination::Dialog => {
            let picked = rfd::FileDialog::new()
                .set_title("Save Invoice")
                .set_directory(settings.output_path())
                .set_file_name(file_name.as_str())
                .add_filter("PDF", &["pdf"])
                .save_file();
            match picked {
                Some(path) => path,
                None => return Ok(None),
            }
        }
    };

    fs::write(&target, bytes)?;
    info!(path = %target.display(), pages = summary.pages, "invoice exported");
    Ok(Some(target))
}
