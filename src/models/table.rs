use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::Speaker;

/// Header of the leading row identifier column in persisted tables
pub const ROW_ID_COLUMN: &str = "Participant_ID";
pub const ID_COLUMN: &str = "ID";
pub const PAGE_NUM_COLUMN: &str = "PageNum";

/// The fixed columns every results table carries, in output order
pub fn fixed_columns() -> Vec<String> {
    let mut columns = vec![ID_COLUMN.to_string(), PAGE_NUM_COLUMN.to_string()];
    columns.extend(Speaker::ALL.map(Speaker::transcript_column));
    columns.extend(Speaker::ALL.map(Speaker::word_count_column));
    columns
}

/// Whether `name` is taken by the row id or one of the fixed columns
pub fn is_reserved_column(name: &str) -> bool {
    name == ROW_ID_COLUMN || fixed_columns().iter().any(|c| c == name)
}

/// One transcript page of one document
#[derive(Debug, Clone, PartialEq)]
pub struct PageRow {
    /// Composite key, `"{document}-Page-{label}"` for parsed rows
    pub row_id: String,
    /// Source document identifier
    pub id: String,
    /// Page label as written in the marker, e.g. "12" or "12-a"
    pub page_num: String,
    pub parent_transcript: Option<String>,
    pub child_transcript: Option<String>,
    pub parent_word_count: i64,
    pub child_word_count: i64,
    /// Cells aligned with `ResultsTable::keyword_columns`
    keyword_cells: Vec<Option<i64>>,
}

impl PageRow {
    pub fn new(row_id: String, id: String, page_num: String) -> Self {
        Self {
            row_id,
            id,
            page_num,
            parent_transcript: None,
            child_transcript: None,
            parent_word_count: 0,
            child_word_count: 0,
            keyword_cells: Vec::new(),
        }
    }

    /// Row key for a page of a document
    pub fn row_id_for(document_id: &str, page_label: &str) -> String {
        format!("{}-Page-{}", document_id, page_label)
    }

    pub fn transcript(&self, speaker: Speaker) -> Option<&str> {
        match speaker {
            Speaker::Parent => self.parent_transcript.as_deref(),
            Speaker::Child => self.child_transcript.as_deref(),
        }
    }

    pub fn transcript_mut(&mut self, speaker: Speaker) -> &mut Option<String> {
        match speaker {
            Speaker::Parent => &mut self.parent_transcript,
            Speaker::Child => &mut self.child_transcript,
        }
    }

    /// Append a paragraph to the speaker's transcript, space separated
    pub fn append_transcript(&mut self, speaker: Speaker, text: &str) {
        let transcript = self.transcript_mut(speaker).get_or_insert_with(String::new);
        transcript.push(' ');
        transcript.push_str(text);
    }

    pub fn word_count(&self, speaker: Speaker) -> i64 {
        match speaker {
            Speaker::Parent => self.parent_word_count,
            Speaker::Child => self.child_word_count,
        }
    }

    /// Add a (possibly negative) net word count to the speaker's total
    pub fn add_words(&mut self, speaker: Speaker, words: i64) {
        match speaker {
            Speaker::Parent => self.parent_word_count += words,
            Speaker::Child => self.child_word_count += words,
        }
    }

    pub fn keyword_cell(&self, column: usize) -> Option<i64> {
        self.keyword_cells.get(column).copied().flatten()
    }

    pub fn keyword_cells(&self) -> &[Option<i64>] {
        &self.keyword_cells
    }

    pub fn set_keyword_cell(&mut self, column: usize, value: Option<i64>) {
        if self.keyword_cells.len() <= column {
            self.keyword_cells.resize(column + 1, None);
        }
        self.keyword_cells[column] = value;
    }
}

/// Results table: one row per transcript page, keyed by row id
///
/// Rows keep insertion order. Keyword columns are append-only and can only be
/// introduced through [`ResultsTable::add_keyword_column`].
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    rows: Vec<PageRow>,
    index: HashMap<String, usize>,
    keyword_columns: Vec<String>,
    /// Fixed columns absent from a loaded checkpoint
    missing_columns: Vec<String>,
    /// File the table was loaded from, if any
    source: Option<PathBuf>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut PageRow> {
        self.rows.iter_mut()
    }

    pub fn get(&self, row_id: &str) -> Option<&PageRow> {
        self.index.get(row_id).map(|&i| &self.rows[i])
    }

    pub fn get_mut(&mut self, row_id: &str) -> Option<&mut PageRow> {
        self.index.get(row_id).map(|&i| &mut self.rows[i])
    }

    /// Get the row for a document page, creating it with default cells if new
    pub fn ensure_row(&mut self, document_id: &str, page_label: &str) -> &mut PageRow {
        let row_id = PageRow::row_id_for(document_id, page_label);
        let existing = self.index.get(&row_id).copied();
        let position = match existing {
            Some(i) => i,
            None => {
                let row = PageRow::new(
                    row_id.clone(),
                    document_id.to_string(),
                    page_label.to_string(),
                );
                self.push_row(row)
            }
        };
        let row = &mut self.rows[position];
        row.id = document_id.to_string();
        row.page_num = page_label.to_string();
        row
    }

    /// Insert a fully-formed row; returns false if the row id is already taken
    pub fn insert_row(&mut self, row: PageRow) -> bool {
        if self.index.contains_key(&row.row_id) {
            return false;
        }
        self.push_row(row);
        true
    }

    fn push_row(&mut self, mut row: PageRow) -> usize {
        row.keyword_cells.resize(self.keyword_columns.len(), None);
        let position = self.rows.len();
        self.index.insert(row.row_id.clone(), position);
        self.rows.push(row);
        position
    }

    pub fn keyword_columns(&self) -> &[String] {
        &self.keyword_columns
    }

    pub fn keyword_column_index(&self, name: &str) -> Option<usize> {
        self.keyword_columns.iter().position(|c| c == name)
    }

    /// Add a keyword column, or return the position of an existing one
    ///
    /// Newly added columns start unset in every row. Returns `None` for the
    /// name of a fixed column, which a keyword column may never shadow.
    pub fn add_keyword_column(&mut self, name: &str) -> Option<usize> {
        if is_reserved_column(name) {
            return None;
        }
        if let Some(position) = self.keyword_column_index(name) {
            return Some(position);
        }
        self.keyword_columns.push(name.to_string());
        let width = self.keyword_columns.len();
        for row in &mut self.rows {
            row.keyword_cells.resize(width, None);
        }
        Some(width - 1)
    }

    /// Replace every unset keyword cell with 0, returning how many were filled
    pub fn fill_unset_keyword_cells(&mut self) -> usize {
        let mut filled = 0;
        for row in &mut self.rows {
            for cell in row.keyword_cells.iter_mut().filter(|c| c.is_none()) {
                *cell = Some(0);
                filled += 1;
            }
        }
        filled
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub(crate) fn set_source(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
    }

    pub(crate) fn mark_missing_column(&mut self, column: &str) {
        if !self.missing_columns.iter().any(|c| c == column) {
            self.missing_columns.push(column.to_string());
        }
    }

    /// Whether the table carries the named fixed or keyword column
    pub fn has_column(&self, column: &str) -> bool {
        if fixed_columns().iter().any(|c| c == column) {
            return !self.missing_columns.iter().any(|c| c == column);
        }
        self.keyword_column_index(column).is_some()
    }

    /// Full header in output order, including the leading row id column
    pub fn header(&self) -> Vec<String> {
        let mut header = vec![ROW_ID_COLUMN.to_string()];
        header.extend(fixed_columns());
        header.extend(self.keyword_columns.iter().cloned());
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_row_reuses_existing_row() {
        let mut table = ResultsTable::new();
        table.ensure_row("doc1", "3").append_transcript(Speaker::Parent, "hello");
        table.ensure_row("doc1", "4");
        table.ensure_row("doc1", "3").append_transcript(Speaker::Parent, "again");

        assert_eq!(table.len(), 2);
        let row = table.get("doc1-Page-3").unwrap();
        assert_eq!(row.parent_transcript.as_deref(), Some(" hello again"));
        assert_eq!(row.child_transcript, None);
        assert_eq!(row.id, "doc1");
        assert_eq!(row.page_num, "3");
    }

    #[test]
    fn test_keyword_columns_are_append_only() {
        let mut table = ResultsTable::new();
        table.ensure_row("doc1", "1");

        assert_eq!(table.add_keyword_column("P_happy"), Some(0));
        assert_eq!(table.add_keyword_column("C_happy"), Some(1));
        assert_eq!(table.add_keyword_column("P_happy"), Some(0));
        assert_eq!(table.keyword_columns(), &["P_happy", "C_happy"]);

        // Rows created later are padded to the current width
        table.ensure_row("doc1", "2");
        assert_eq!(table.get("doc1-Page-2").unwrap().keyword_cells().len(), 2);
    }

    #[test]
    fn test_keyword_column_cannot_shadow_fixed_column() {
        let mut table = ResultsTable::new();
        table.ensure_row("doc1", "1");

        assert_eq!(table.add_keyword_column("P_transcript"), None);
        assert_eq!(table.add_keyword_column("C_WordCount"), None);
        assert_eq!(table.add_keyword_column("Participant_ID"), None);
        assert!(table.keyword_columns().is_empty());
        assert!(table.get("doc1-Page-1").unwrap().keyword_cells().is_empty());
        assert_eq!(table.header().len(), 7);
    }

    #[test]
    fn test_fill_unset_keyword_cells() {
        let mut table = ResultsTable::new();
        table.ensure_row("doc1", "1");
        table.ensure_row("doc1", "2");
        let column = table.add_keyword_column("P_sad").unwrap();
        table.get_mut("doc1-Page-1").unwrap().set_keyword_cell(column, Some(2));

        assert_eq!(table.fill_unset_keyword_cells(), 1);
        assert_eq!(table.get("doc1-Page-1").unwrap().keyword_cell(column), Some(2));
        assert_eq!(table.get("doc1-Page-2").unwrap().keyword_cell(column), Some(0));
    }

    #[test]
    fn test_header_and_missing_columns() {
        let mut table = ResultsTable::new();
        table.add_keyword_column("P_x");
        assert_eq!(
            table.header(),
            vec![
                "Participant_ID",
                "ID",
                "PageNum",
                "P_transcript",
                "C_transcript",
                "P_WordCount",
                "C_WordCount",
                "P_x"
            ]
        );

        assert!(table.has_column("C_transcript"));
        table.mark_missing_column("C_transcript");
        assert!(!table.has_column("C_transcript"));
        assert!(table.has_column("P_x"));
        assert!(!table.has_column("C_x"));
    }

    #[test]
    fn test_negative_word_counts_are_kept() {
        let mut row = PageRow::new("d-Page-1".into(), "d".into(), "1".into());
        row.add_words(Speaker::Child, -2);
        row.add_words(Speaker::Child, 1);
        assert_eq!(row.word_count(Speaker::Child), -1);
        assert_eq!(row.word_count(Speaker::Parent), 0);
    }
}
