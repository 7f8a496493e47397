use std::path::PathBuf;

use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::io::{KeywordSourceConfig, load_keywords, load_table, save_table};
use crate::models::ResultsTable;
use crate::stages::{ParseSummary, TallySummary, parse_directory, tally_keywords};

/// What a full run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Results file written at the end of the run
    pub save_path: PathBuf,
    /// Rows in the final table
    pub rows: usize,
    /// Present when documents were parsed rather than reloaded
    pub parse: Option<ParseSummary>,
    pub tally: TallySummary,
}

/// Build the per-page table, either from a setup file or by parsing documents
///
/// A freshly parsed table is saved straight away so later runs can reload it.
pub fn build_table(config: &RunConfig) -> Result<(ResultsTable, Option<ParseSummary>)> {
    if let Some(setup_file) = &config.setup_file {
        info!("Loading previous results from {:?}", setup_file);
        return Ok((load_table(setup_file)?, None));
    }

    let mut table = ResultsTable::new();
    let summary = parse_directory(&config.origin_directory, &mut table)?;
    let save_path = config.save_path();
    save_table(&table, &save_path)?;
    info!(
        "Parsed {} documents into {} pages, saved to {:?}",
        summary.documents,
        table.len(),
        save_path
    );
    Ok((table, Some(summary)))
}

/// Tally the configured keywords into the table and save it
pub fn search_keys(config: &RunConfig, table: &mut ResultsTable) -> Result<TallySummary> {
    let source = KeywordSourceConfig {
        has_headers: config.keys_header,
    };
    let queries = load_keywords(&config.keys_file, &source)?;
    let summary = tally_keywords(table, &queries)?;

    let save_path = config.save_path();
    save_table(table, &save_path)?;
    info!("Results saved to {:?}", save_path);
    Ok(summary)
}

/// Validate the configuration, build the table, then tally keywords
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    config.validate()?;
    let (mut table, parse) = build_table(config)?;
    let tally = search_keys(config, &mut table)?;

    Ok(RunOutcome {
        save_path: config.save_path(),
        rows: table.len(),
        parse,
        tally,
    })
}
