use std::io::Cursor;

use calamine::{Reader, Xlsx};
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::models::FileType;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),
    #[error("failed to extract text from workbook: {0}")]
    Workbook(String),
}

/// Converts raw document bytes into plain text. PDF and XLSX can fail on
/// unreadable content; CSV always yields a best-effort decode.
pub fn extract_text(bytes: &[u8], file_type: FileType) -> Result<String, ExtractError> {
    match file_type {
        FileType::Pdf => extract_pdf(bytes),
        FileType::Csv => Ok(extract_csv(bytes)),
        FileType::Xlsx => extract_xlsx(bytes),
    }
}

/// Per-page text, each page followed by any detected table rows flattened to
/// pipe-delimited lines. Plain text extraction tends to drop or reorder the
/// numeric columns that carry holdings data, so the flattened rows are
/// appended rather than replacing the page text.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut parts = Vec::new();
    for (&page_number, _) in doc.get_pages().iter() {
        let page_text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("skipping PDF page {}: {}", page_number, e);
                continue;
            }
        };
        if page_text.trim().is_empty() {
            continue;
        }
        parts.push(page_text.trim_end().to_string());
        parts.extend(flatten_table_rows(&page_text));
    }

    if parts.is_empty() {
        return Err(ExtractError::Pdf("no extractable text".to_string()));
    }
    Ok(parts.join("\n"))
}

/// Column-aligned lines (two or more runs of consecutive spaces) are treated
/// as table rows and re-emitted with `|` separators.
fn flatten_table_rows(page_text: &str) -> Vec<String> {
    let column_gap = Regex::new(r"\s{2,}").expect("valid column pattern");

    page_text
        .lines()
        .filter_map(|line| {
            let cells: Vec<&str> = column_gap
                .split(line.trim())
                .filter(|cell| !cell.is_empty())
                .collect();
            (cells.len() >= 3).then(|| cells.join(" | "))
        })
        .collect()
}

/// Ordered candidate encodings: strict UTF-8, then Windows-1252 (the WHATWG
/// superset of Latin-1). A structural CSV failure under an encoding falls
/// back to the raw decoded text under that same encoding; if nothing decodes
/// cleanly, invalid bytes are substituted rather than raised.
fn extract_csv(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return csv_rows_or_raw(text);
    }

    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors {
        return csv_rows_or_raw(&decoded);
    }

    String::from_utf8_lossy(bytes).into_owned()
}

fn csv_rows_or_raw(text: &str) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(record.iter().collect::<Vec<_>>().join(" | ")),
            // Irregular shape: hand the raw text downstream instead of aborting.
            Err(_) => return text.to_string(),
        }
    }

    if rows.is_empty() {
        text.to_string()
    } else {
        rows.join("\n")
    }
}

/// Every sheet is flattened, prefixed with a boundary marker so downstream
/// recovery can attribute fields to a sheet.
fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> =
        Xlsx::new(cursor).map_err(|e| ExtractError::Workbook(e.to_string()))?;

    let mut parts = Vec::new();
    for sheet_name in workbook.sheet_names().to_owned() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;

        parts.push(format!("=== Sheet: {} ===", sheet_name));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            parts.push(cells.join(" | "));
        }
    }

    if parts.is_empty() {
        return Err(ExtractError::Workbook("workbook has no sheets".to_string()));
    }
    Ok(parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_utf8_rows() {
        let text = extract_csv(b"name,shares\nApple Inc.,100\n");
        assert_eq!(text, "name | shares\nApple Inc. | 100");
    }

    #[test]
    fn test_csv_windows_1252_fallback() {
        // 0xE9 is é in Windows-1252 but invalid as a UTF-8 start byte here.
        let bytes = b"name,valeur\nSoci\xe9t\xe9 G\xe9n\xe9rale,500\n";
        let text = extract_csv(bytes);
        assert!(text.contains("Société Générale"));
        assert!(text.contains(" | "));
    }

    #[test]
    fn test_csv_structural_failure_returns_raw_text() {
        // Unterminated quote makes the reader error mid-stream.
        let raw = "name,shares\n\"broken,100\nnext,200\n";
        let text = extract_csv(raw.as_bytes());
        assert_eq!(text, raw);
    }

    #[test]
    fn test_csv_arbitrary_bytes_never_fail() {
        let text = extract_csv(b"a,b\n\xff\x81,2\n");
        assert!(!text.is_empty());
    }

    #[test]
    fn test_pdf_garbage_is_an_error() {
        let result = extract_text(b"not a pdf at all", FileType::Pdf);
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[test]
    fn test_xlsx_garbage_is_an_error() {
        let result = extract_text(b"not a workbook", FileType::Xlsx);
        assert!(matches!(result, Err(ExtractError::Workbook(_))));
    }

    #[test]
    fn test_table_rows_flattened_with_pipes() {
        let page = "Holdings Statement\nAAPL   100   18550.00\nVOO   25   11000.00\nfooter";
        let rows = flatten_table_rows(page);
        assert_eq!(rows, vec!["AAPL | 100 | 18550.00", "VOO | 25 | 11000.00"]);
    }
}
