use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{AttendanceRecord, SessionKind};
use crate::recommend::attendance_percentage;

static SUBJECT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]{5,15}$").expect("valid subject code pattern"));

// CODE NAME SHORT KIND PRESENT ABSENT TOTAL PERCENT
static PDF_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Z0-9]{5,15})\s+(.+?)\s+([A-Z0-9-]{2,10})\s+([LTP])\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)",
    )
    .expect("valid PDF row pattern")
});

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("valid cell selector"));

const MIN_CELLS: usize = 8;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("report is not a readable PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to read report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Pdf,
}

impl ReportFormat {
    /// HTML when the MIME type or extension says so; every other upload is read as a PDF.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        let lowered = file_name.to_lowercase();
        if mime == Some("text/html") || lowered.ends_with(".html") || lowered.ends_with(".htm") {
            ReportFormat::Html
        } else {
            ReportFormat::Pdf
        }
    }
}

pub fn extract_file(path: &Path, mime: Option<&str>) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = ReportFormat::detect(&file_name, mime);

    info!(file = %path.display(), ?format, "extracting attendance report");
    extract(&bytes, format)
}

pub fn extract(bytes: &[u8], format: ReportFormat) -> Result<Vec<AttendanceRecord>, ExtractError> {
    let records = match format {
        // Non-UTF-8 bytes become U+FFFD; the rest of the page still parses.
        ReportFormat::Html => parse_html(&String::from_utf8_lossy(bytes)),
        ReportFormat::Pdf => parse_pdf_text(&pdf_text(bytes)?),
    };

    info!(records = records.len(), "attendance report parsed");
    Ok(records)
}

pub fn parse_html(document: &str) -> Vec<AttendanceRecord> {
    let html = Html::parse_document(document);

    html.select(&ROW_SELECTOR)
        .filter_map(|row| parse_row(&row_cells(row)))
        .collect()
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|cell| {
            cell.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Accepts a table row as attendance data: at least eight cells, a subject
/// code in the second, session letter in the fifth, attended and total counts
/// in the sixth and eighth. The source percentage column is ignored.
pub fn parse_row(cells: &[String]) -> Option<AttendanceRecord> {
    if cells.len() < MIN_CELLS || !SUBJECT_CODE.is_match(&cells[1]) {
        return None;
    }

    let (Ok(attended), Ok(total)) = (cells[5].parse::<u32>(), cells[7].parse::<u32>()) else {
        debug!(code = %cells[1], "skipping row with non-numeric counts");
        return None;
    };

    Some(AttendanceRecord {
        code: cells[1].clone(),
        name: cells[2].clone(),
        session_kind: SessionKind::from_letter(&cells[4]),
        attended,
        total,
        percentage: attendance_percentage(attended, total),
    })
}

/// Page text joined token by token with single spaces. Column layout is not preserved.
pub fn pdf_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let document = lopdf::Document::load_mem(bytes)?;
    let mut tokens: Vec<String> = Vec::new();

    for page in document.get_pages().into_keys() {
        let text = document.extract_text(&[page])?;
        tokens.extend(text.split_whitespace().map(str::to_string));
    }

    Ok(tokens.join(" "))
}

/// Single regex pass over the flattened text. The lazy name capture can pull
/// in text from a neighbouring cell when the PDF orders columns differently
/// from the printed layout.
pub fn parse_pdf_text(text: &str) -> Vec<AttendanceRecord> {
    PDF_ROW
        .captures_iter(text)
        .filter_map(|captures| {
            let attended = captures[5].parse::<u32>().ok()?;
            let total = captures[7].parse::<u32>().ok()?;
            Some(AttendanceRecord {
                code: captures[1].to_string(),
                name: captures[2].trim().to_string(),
                session_kind: SessionKind::from_letter(&captures[4]),
                attended,
                total,
                percentage: attendance_percentage(attended, total),
            })
        })
        .collect()
}
