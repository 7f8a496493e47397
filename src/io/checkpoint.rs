use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::{Result, WordCountError};
use crate::models::{
    ID_COLUMN, PAGE_NUM_COLUMN, PageRow, ResultsTable, Speaker, fixed_columns,
};

/// Write the results table as CSV with a header row
///
/// Unset transcript and keyword cells are written empty.
pub fn save_table(table: &ResultsTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WordCountError::io(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| WordCountError::csv(path, e))?;
    writer
        .write_record(table.header())
        .map_err(|e| WordCountError::csv(path, e))?;

    for row in table.rows() {
        writer
            .write_record(row_record(row))
            .map_err(|e| WordCountError::csv(path, e))?;
    }

    writer.flush().map_err(|e| WordCountError::io(path, e))?;
    debug!("Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}

fn row_record(row: &PageRow) -> Vec<String> {
    let mut record = vec![row.row_id.clone(), row.id.clone(), row.page_num.clone()];
    for speaker in Speaker::ALL {
        record.push(row.transcript(speaker).unwrap_or_default().to_string());
    }
    for speaker in Speaker::ALL {
        record.push(row.word_count(speaker).to_string());
    }
    record.extend(
        row.keyword_cells()
            .iter()
            .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
    );
    record
}

/// Positions of the known columns in a loaded header
struct ColumnLayout {
    id: Option<usize>,
    page_num: Option<usize>,
    transcripts: [Option<usize>; 2],
    word_counts: [Option<usize>; 2],
    /// (position, name) of every other column
    keywords: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Self {
        // The first column always holds the row id
        let find = |name: &str| headers.iter().skip(1).position(|h| h == name).map(|i| i + 1);
        let fixed = fixed_columns();
        let keywords = headers
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, h)| !fixed.iter().any(|f| f == h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Self {
            id: find(ID_COLUMN),
            page_num: find(PAGE_NUM_COLUMN),
            transcripts: Speaker::ALL.map(|s| find(&s.transcript_column())),
            word_counts: Speaker::ALL.map(|s| find(&s.word_count_column())),
            keywords,
        }
    }
}

/// Load a table previously written by [`save_table`]
///
/// Fixed columns missing from the header are recorded on the table instead of
/// failing here; the keyword tallier reports them. Every column that is not a
/// fixed column is reloaded as a keyword count column.
pub fn load_table(path: &Path) -> Result<ResultsTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| WordCountError::MissingCheckpoint {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|e| WordCountError::csv(path, e))?
        .clone();
    if headers.is_empty() {
        return Err(WordCountError::CheckpointFormat {
            path: path.to_path_buf(),
            reason: "no header row".to_string(),
        });
    }

    let layout = ColumnLayout::from_headers(&headers);
    let mut table = ResultsTable::new();
    table.set_source(path);

    let named_fixed = [
        (ID_COLUMN.to_string(), layout.id),
        (PAGE_NUM_COLUMN.to_string(), layout.page_num),
    ];
    let speaker_fixed = Speaker::ALL.into_iter().enumerate().flat_map(|(i, s)| {
        [
            (s.transcript_column(), layout.transcripts[i]),
            (s.word_count_column(), layout.word_counts[i]),
        ]
    });
    for (column, position) in named_fixed.into_iter().chain(speaker_fixed) {
        if position.is_none() {
            table.mark_missing_column(&column);
        }
    }

    let keyword_positions: Vec<(usize, usize)> = layout
        .keywords
        .iter()
        .filter_map(|(position, name)| {
            table
                .add_keyword_column(name)
                .map(|column| (*position, column))
        })
        .collect();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| WordCountError::csv(path, e))?;
        let cell = |position: Option<usize>| position.and_then(|p| record.get(p)).unwrap_or("");

        let row_id = cell(Some(0)).to_string();
        let mut row = PageRow::new(
            row_id.clone(),
            cell(layout.id).to_string(),
            cell(layout.page_num).to_string(),
        );
        for (i, speaker) in Speaker::ALL.into_iter().enumerate() {
            let text = cell(layout.transcripts[i]);
            if !text.is_empty() {
                *row.transcript_mut(speaker) = Some(text.to_string());
            }
            let count = parse_count(cell(layout.word_counts[i]))
                .map_err(|reason| format_error(path, line, &speaker.word_count_column(), reason))?;
            row.add_words(speaker, count.unwrap_or(0));
        }
        for &(position, column) in &keyword_positions {
            let name = &table.keyword_columns()[column];
            let value = parse_count(cell(Some(position)))
                .map_err(|reason| format_error(path, line, name, reason))?;
            row.set_keyword_cell(column, value);
        }

        if !table.insert_row(row) {
            return Err(WordCountError::CheckpointFormat {
                path: path.to_path_buf(),
                reason: format!("duplicate row id {:?}", row_id),
            });
        }
    }

    debug!("Loaded {} rows from {:?}", table.len(), path);
    Ok(table)
}

fn format_error(path: &Path, line: usize, column: &str, reason: String) -> WordCountError {
    WordCountError::CheckpointFormat {
        path: path.to_path_buf(),
        // +2: header row plus 1-based numbering
        reason: format!("row {} column {}: {}", line + 2, column, reason),
    }
}

/// Parse a count cell; empty means unset
///
/// Integral floats ("3.0") are accepted since spreadsheet tools rewrite
/// integer columns that way.
fn parse_count(cell: &str) -> std::result::Result<Option<i64>, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = cell.parse::<i64>() {
        return Ok(Some(value));
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(Some(value as i64)),
        _ => Err(format!("expected a whole number, got {:?}", cell)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ResultsTable {
        let mut table = ResultsTable::new();
        let row = table.ensure_row("fam01", "1");
        row.append_transcript(Speaker::Parent, "Parent: Are you happy, dear?");
        row.add_words(Speaker::Parent, 5);
        let row = table.ensure_row("fam01", "2a");
        row.append_transcript(Speaker::Child, "Child: no, \"sad\"\nreally");
        row.add_words(Speaker::Child, -1);
        table
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("counts.csv");
        let mut table = sample_table();
        let column = table.add_keyword_column("P_happy").unwrap();
        table.get_mut("fam01-Page-1").unwrap().set_keyword_cell(column, Some(1));

        save_table(&table, &path).unwrap();
        let loaded = load_table(&path).unwrap();

        assert_eq!(loaded.rows(), table.rows());
        assert_eq!(loaded.keyword_columns(), &["P_happy"]);
        assert_eq!(loaded.source(), Some(path.as_path()));
        assert!(loaded.has_column("P_transcript"));
        assert!(loaded.has_column("C_transcript"));
    }

    #[test]
    fn test_fixed_column_query_keeps_round_trip_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        let mut table = sample_table();
        let queries = vec!["transcript".to_string(), "happy".to_string()];
        crate::stages::tally_keywords(&mut table, &queries).unwrap();

        save_table(&table, &path).unwrap();
        let loaded = load_table(&path).unwrap();

        assert_eq!(table.keyword_columns(), &["P_happy", "C_happy"]);
        assert_eq!(loaded.keyword_columns(), table.keyword_columns());
        assert_eq!(loaded.rows(), table.rows());
    }

    #[test]
    fn test_saved_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        save_table(&sample_table(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert_eq!(
            content.lines().next(),
            Some("Participant_ID,ID,PageNum,P_transcript,C_transcript,P_WordCount,C_WordCount")
        );
        assert!(content.contains("fam01-Page-2a,fam01,2a,,"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, WordCountError::MissingCheckpoint { .. }));
    }

    #[test]
    fn test_load_records_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign.csv");
        std::fs::write(&path, "Participant_ID,ID,PageNum,P_transcript\nx-Page-1,x,1, hi\n").unwrap();

        let table = load_table(&path).unwrap();

        assert!(table.has_column("P_transcript"));
        assert!(!table.has_column("C_transcript"));
        assert!(!table.has_column("P_WordCount"));
        assert_eq!(table.rows()[0].parent_transcript.as_deref(), Some(" hi"));
        assert_eq!(table.rows()[0].parent_word_count, 0);
    }

    #[test]
    fn test_load_accepts_float_counts_and_blank_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        std::fs::write(
            &path,
            "Participant_ID,ID,PageNum,P_transcript,C_transcript,P_WordCount,C_WordCount,P_sad,C_sad\n\
             a-Page-1,a,1, sad,,4.0,0,1.0,\n",
        )
        .unwrap();

        let table = load_table(&path).unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.parent_word_count, 4);
        assert_eq!(row.child_transcript, None);
        assert_eq!(row.keyword_cell(0), Some(1));
        assert_eq!(row.keyword_cells()[1], None);
    }

    #[test]
    fn test_load_rejects_non_numeric_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");
        std::fs::write(
            &path,
            "Participant_ID,ID,PageNum,P_transcript,C_transcript,P_WordCount,C_WordCount\n\
             a-Page-1,a,1,,,lots,0\n",
        )
        .unwrap();

        let err = load_table(&path).unwrap_err();

        assert!(matches!(err, WordCountError::CheckpointFormat { .. }));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(""), Ok(None));
        assert_eq!(parse_count("12"), Ok(Some(12)));
        assert_eq!(parse_count("-3"), Ok(Some(-3)));
        assert_eq!(parse_count("7.0"), Ok(Some(7)));
        assert!(parse_count("7.5").is_err());
        assert!(parse_count("abc").is_err());
    }
}
