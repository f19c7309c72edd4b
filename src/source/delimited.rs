/// CSV sources, for FAQ sheets exported from a spreadsheet tool.
use std::path::Path;

use super::{REQUIRED_COLUMNS, RawRow};
use crate::error::{FaqError, Result};

pub fn read_raw_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| FaqError::Schema(format!("failed to open {}: {e}", path.display())))?;

    let width = reader
        .headers()
        .map_err(|e| FaqError::Schema(format!("failed to read header: {e}")))?
        .len();
    if width < REQUIRED_COLUMNS {
        return Err(FaqError::Schema(format!(
            "{} needs at least {REQUIRED_COLUMNS} columns, found {width}",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FaqError::Schema(format!("malformed CSV row: {e}")))?;
        rows.push(std::array::from_fn(|col| record.get(col).map(String::from)));
    }

    Ok(rows)
}
