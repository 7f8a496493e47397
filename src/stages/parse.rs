use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, WordCountError};
use crate::io::read_docx_paragraphs;
use crate::markup::{detect_speaker, find_page_label, is_stop_label, net_word_count};
use crate::models::{ResultsTable, Speaker};

/// Extension of the transcript documents picked up from a directory
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Result of parsing a directory of transcripts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Documents read
    pub documents: usize,
    /// Entries skipped for not being transcript documents
    pub skipped_entries: usize,
    /// "stop" page markers encountered
    pub stop_pages: usize,
}

/// Running state while walking one document's paragraphs
#[derive(Debug, Default)]
struct ParseState {
    page_label: Option<String>,
    speaker: Option<Speaker>,
    /// Row id receiving text; `None` before the first page and on "stop" pages
    target_row: Option<String>,
}

/// Walk a document's paragraphs and accumulate them into the table
///
/// For each non-empty paragraph, in order:
/// 1. A leading "paren"/"child" tag switches the active speaker
/// 2. A `[page N]` marker switches the target row (a "stop" page has none)
/// 3. With a target row, the paragraph's text and net word count go to the
///    active speaker's columns
///
/// Returns the number of "stop" pages seen.
pub fn parse_paragraphs<S: AsRef<str>>(
    document_id: &str,
    paragraphs: &[S],
    table: &mut ResultsTable,
) -> usize {
    let mut state = ParseState::default();
    let mut stop_pages = 0;

    for paragraph in paragraphs {
        let text = paragraph.as_ref();
        if text.is_empty() {
            continue;
        }

        if let Some(speaker) = detect_speaker(text) {
            state.speaker = Some(speaker);
        }

        if let Some(label) = find_page_label(text) {
            state.page_label = Some(label.to_string());
            if is_stop_label(label) {
                info!("Stop page detected in {}", document_id);
                stop_pages += 1;
                state.target_row = None;
            } else {
                let row = table.ensure_row(document_id, label);
                state.target_row = Some(row.row_id.clone());
            }
        }

        let Some(row_id) = state.target_row.as_deref() else {
            continue;
        };
        let Some(row) = table.get_mut(row_id) else {
            continue;
        };
        if let Some(speaker) = state.speaker {
            row.append_transcript(speaker, text);
            row.add_words(speaker, net_word_count(text));
        }
    }

    debug!(
        "Finished {} on page {:?}",
        document_id,
        state.page_label.as_deref().unwrap_or("-")
    );
    stop_pages
}

/// Document identifier: the file name without its extension
pub fn document_id(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| WordCountError::document(path, "file name is not valid UTF-8"))
}

/// Parse one transcript document into the table; returns the "stop" pages seen
pub fn parse_document(path: &Path, table: &mut ResultsTable) -> Result<usize> {
    let document_id = document_id(path)?;
    info!("Working to analyze {}", document_id);
    let paragraphs = read_docx_paragraphs(path)?;
    Ok(parse_paragraphs(&document_id, &paragraphs, table))
}

/// Parse every transcript document in a directory, in listing order
///
/// The first unreadable document aborts the batch.
pub fn parse_directory(directory: &Path, table: &mut ResultsTable) -> Result<ParseSummary> {
    let entries =
        std::fs::read_dir(directory).map_err(|e| WordCountError::io(directory, e))?;
    let mut summary = ParseSummary::default();

    for entry in entries {
        let path = entry.map_err(|e| WordCountError::io(directory, e))?.path();
        let is_document = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
        if !is_document {
            debug!("Skipping {:?}", path);
            summary.skipped_entries += 1;
            continue;
        }

        summary.stop_pages += parse_document(&path, table)?;
        summary.documents += 1;
    }

    if summary.documents == 0 {
        warn!("No .{} documents found in {:?}", DOCUMENT_EXTENSION, directory);
    }
    Ok(summary)
}
