use std::path::Path;

use csv::StringRecord;

use crate::error::{Result, WordCountError};

/// Cells spreadsheet exports use for missing values
const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>", "#N/A N/A", "-1.#IND", "1.#QNAN", "-1.#QNAN", "1.#IND",
];

/// Options for reading a keyword source file
#[derive(Debug, Clone, Default)]
pub struct KeywordSourceConfig {
    /// Treat the first row as a header and take no queries from it
    pub has_headers: bool,
}

/// Read every keyword query from a CSV file of arbitrary shape
pub fn load_keywords(path: &Path, config: &KeywordSourceConfig) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(config.has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| WordCountError::csv(path, e))?;

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| WordCountError::csv(path, e))?);
    }
    Ok(collect_queries(&records))
}

/// Text cells in row-major order; blanks, numbers and booleans are skipped
pub fn collect_queries(records: &[StringRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.iter())
        .filter(|cell| is_text_cell(cell))
        .map(str::to_string)
        .collect()
}

/// Whether a raw cell reads as text rather than a blank, number or boolean
pub fn is_text_cell(cell: &str) -> bool {
    if cell.is_empty() || MISSING_MARKERS.contains(&cell) {
        return false;
    }
    let trimmed = cell.trim();
    let is_number =
        trimmed.bytes().any(|b| b.is_ascii_digit()) && trimmed.parse::<f64>().is_ok();
    let is_bool = trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false");
    !(is_number || is_bool)
}
