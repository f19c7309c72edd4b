//! Spreadsheet loader: turns a question/age/answer table into [`SourceRow`]s.
//!
//! Only the first three columns are read, in fixed order, and the first row
//! is a header. Question cells are forward-filled so that merged cells (which
//! readers report as blanks on continuation rows) keep their question.
pub mod delimited;
pub mod spreadsheet;

use std::path::Path;

use tracing::{debug, info};

use crate::error::{FaqError, Result};
use crate::models::{NOT_AVAILABLE, SourceRow, is_missing_question};

/// Number of leading columns the loader consumes.
pub const REQUIRED_COLUMNS: usize = 3;

/// The three leading cells of one data row; `None` means blank or missing.
pub type RawRow = [Option<String>; REQUIRED_COLUMNS];

/// Load the table at `path`, dispatching on the file extension.
pub fn load_rows(path: &Path) -> Result<Vec<SourceRow>> {
    if !path.exists() {
        return Err(FaqError::SourceNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let raw = match ext.as_str() {
        "csv" => delimited::read_raw_rows(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => spreadsheet::read_raw_rows(path)?,
        other => {
            return Err(FaqError::Schema(format!(
                "unsupported source format '{other}': {}",
                path.display()
            )));
        }
    };

    let total = raw.len();
    let rows = normalize_rows(raw);
    info!(
        "Loaded {} rows from {} ({} dropped)",
        rows.len(),
        path.display(),
        total - rows.len()
    );
    Ok(rows)
}

/// Apply forward-fill, the `N/A` sentinel, and the drop rule.
pub fn normalize_rows<I>(raw: I) -> Vec<SourceRow>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut last_question: Option<String> = None;
    let mut rows = Vec::new();

    for (idx, [question, age_context, answer]) in raw.into_iter().enumerate() {
        if let Some(q) = clean_cell(question) {
            last_question = Some(q);
        }

        let Some(question) = last_question.as_deref() else {
            debug!("Skipping data row {idx}: no question above it");
            continue;
        };
        if is_missing_question(question) {
            debug!("Skipping data row {idx}: placeholder question");
            continue;
        }

        rows.push(SourceRow {
            question: question.to_string(),
            age_context: clean_cell(age_context).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            answer: clean_cell(answer).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        });
    }

    rows
}

/// Trim a cell; whitespace-only text counts as blank.
fn clean_cell(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(q: Option<&str>, age: Option<&str>, ans: Option<&str>) -> RawRow {
        [q.map(String::from), age.map(String::from), ans.map(String::from)]
    }

    #[test]
    fn test_forward_fill_question() {
        let rows = normalize_rows(vec![
            raw(Some("Qual o horário?"), Some("0-2"), Some("Das 8h às 18h")),
            raw(None, Some("3-5"), Some("Das 9h às 17h")),
            raw(Some("   "), Some("6+"), Some("Das 10h às 16h")),
        ]);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.question == "Qual o horário?"));
    }

    #[test]
    fn test_blank_age_and_answer_become_sentinel() {
        let rows = normalize_rows(vec![raw(Some("Q"), None, Some("  "))]);
        assert_eq!(rows[0].age_context, NOT_AVAILABLE);
        assert_eq!(rows[0].answer, NOT_AVAILABLE);
    }

    #[test]
    fn test_leading_rows_without_question_are_dropped() {
        let rows = normalize_rows(vec![
            raw(None, Some("0-2"), Some("orphan")),
            raw(Some("Q"), Some("0-2"), Some("kept")),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].answer, "kept");
    }

    #[test]
    fn test_nan_question_and_its_continuations_are_dropped() {
        let rows = normalize_rows(vec![
            raw(Some("NaN"), Some("0-2"), Some("x")),
            raw(None, Some("3-5"), Some("y")),
            raw(Some("Q"), None, Some("z")),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question, "Q");
    }

    #[test]
    fn test_cells_are_trimmed() {
        let rows = normalize_rows(vec![raw(Some("  Q  "), Some(" 0-2 "), Some(" a "))]);
        assert_eq!(
            rows[0],
            SourceRow {
                question: "Q".into(),
                age_context: "0-2".into(),
                answer: "a".into(),
            }
        );
    }

    #[test]
    fn test_missing_source() {
        let err = load_rows(Path::new("/nonexistent/faq.xlsx")).unwrap_err();
        assert!(matches!(err, FaqError::SourceNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.txt");
        std::fs::write(&path, "a,b,c").unwrap();
        assert!(matches!(load_rows(&path), Err(FaqError::Schema(_))));
    }
}
