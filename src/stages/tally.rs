use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Result, WordCountError};
use crate::models::{ResultsTable, Speaker, is_reserved_column};

/// How a keyword query is matched against transcript text
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    /// The query compiled as a regular expression
    Pattern(Regex),
    /// The query is not valid pattern syntax and is matched literally
    Literal(String),
}

impl KeywordMatcher {
    pub fn new(query: &str) -> Self {
        match Regex::new(query) {
            Ok(regex) => Self::Pattern(regex),
            Err(_) => Self::Literal(query.to_string()),
        }
    }

    /// Non-overlapping occurrences in `text`
    pub fn count(&self, text: &str) -> i64 {
        let count = match self {
            Self::Pattern(regex) => regex.find_iter(text).count(),
            Self::Literal(literal) => text.matches(literal.as_str()).count(),
        };
        count as i64
    }
}

/// Result of tallying keywords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallySummary {
    /// Distinct queries tallied
    pub queries: usize,
    /// Queries whose column names clash with the fixed columns
    pub skipped: usize,
    /// Keyword columns that did not exist before
    pub columns_added: usize,
    /// Unset cells replaced with 0 afterwards
    pub cells_filled: usize,
}

/// Count every query in each row's parent and child transcript
///
/// Transcripts are lower-cased before matching. Results land in `P_<query>`
/// and `C_<query>`; rows without a transcript for a speaker get 0.
pub fn tally_keywords(table: &mut ResultsTable, queries: &[String]) -> Result<TallySummary> {
    for speaker in Speaker::ALL {
        let column = speaker.transcript_column();
        if !table.has_column(&column) {
            let path = table
                .source()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("<results table>"));
            return Err(WordCountError::Schema { path, column });
        }
    }

    info!("Analyzing key words");
    let lowered: Vec<[Option<String>; 2]> = table
        .rows()
        .iter()
        .map(|row| Speaker::ALL.map(|s| row.transcript(s).map(str::to_lowercase)))
        .collect();

    let mut summary = TallySummary::default();
    let mut seen = HashSet::new();

    for query in queries {
        if !seen.insert(query.as_str()) {
            debug!("Skipping repeated query {:?}", query);
            continue;
        }
        let names = Speaker::ALL.map(|s| s.keyword_column(query));
        if let Some(name) = names.iter().find(|name| is_reserved_column(name)) {
            warn!("Skipping query {:?}: column {} is a fixed column", query, name);
            summary.skipped += 1;
            continue;
        }
        summary.queries += 1;

        let matcher = KeywordMatcher::new(query);
        for (i, name) in names.iter().enumerate() {
            if table.keyword_column_index(name).is_none() {
                summary.columns_added += 1;
            }
            let Some(column) = table.add_keyword_column(name) else {
                continue;
            };
            for (row, texts) in table.rows_mut().zip(&lowered) {
                let value = texts[i].as_deref().map(|text| matcher.count(text));
                row.set_keyword_cell(column, value);
            }
        }
    }

    summary.cells_filled = table.fill_unset_keyword_cells();
    Ok(summary)
}
