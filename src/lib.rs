pub mod config;
pub mod error;
pub mod io;
pub mod markup;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod stages;

pub use config::RunConfig;
pub use error::{Result, WordCountError};
pub use io::{
    KeywordSourceConfig, load_keywords, load_table, read_docx_paragraphs, save_table,
};
pub use models::{PageRow, ResultsTable, Speaker};
pub use pipeline::{RunOutcome, build_table, run, search_keys};
pub use resolve::{
    ExplicitPaths, PathRequest, PathResolver, PromptPaths, PromptSelection, resolve_paths,
};
pub use stages::{
    ParseSummary, TallySummary, parse_directory, parse_document, parse_paragraphs, tally_keywords,
};
