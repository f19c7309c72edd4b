/// Excel/ODS sources via `calamine`. Only the first worksheet is read.
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use super::{REQUIRED_COLUMNS, RawRow};
use crate::error::{FaqError, Result};

pub fn read_raw_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| FaqError::Schema(format!("failed to open {}: {e}", path.display())))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            return Err(FaqError::Schema(format!(
                "failed to read first worksheet of {}: {e}",
                path.display()
            )));
        }
        None => {
            return Err(FaqError::Schema(format!(
                "{} contains no worksheets",
                path.display()
            )));
        }
    };

    rows_from_range(&range)
}

/// Extract data rows (header skipped) from a worksheet range.
///
/// calamine trims leading empty columns from the range, so cells are
/// re-anchored at sheet column A before picking the first three.
pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<RawRow>> {
    let start_col = range.start().map_or(0, |(_, col)| col as usize);
    let sheet_width = if range.is_empty() {
        0
    } else {
        start_col + range.width()
    };

    if sheet_width < REQUIRED_COLUMNS {
        return Err(FaqError::Schema(format!(
            "sheet needs at least {REQUIRED_COLUMNS} columns, found {sheet_width}"
        )));
    }

    Ok(range
        .rows()
        .skip(1)
        .map(|row| {
            std::array::from_fn(|col| {
                col.checked_sub(start_col)
                    .and_then(|idx| row.get(idx))
                    .and_then(cell_text)
            })
        })
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        // Numeric ages such as `3` come back as floats
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            Some((*f as i64).to_string())
        }
        other => Some(other.to_string()),
    }
}
