use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WordCountError};

/// Extension required for the results file and the keyword file
pub const TABLE_EXTENSION: &str = ".csv";

/// Settings for a word count run
///
/// Every field can be set from a JSON file; unset fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Previously saved results; when set, documents are not parsed again
    pub setup_file: Option<PathBuf>,
    /// Directory holding the .docx transcripts
    pub origin_directory: PathBuf,
    /// Directory the results file is written to
    pub save_directory: PathBuf,
    /// Results file name, must end in .csv
    pub save_file: String,
    /// Keyword queries, must end in .csv
    pub keys_file: PathBuf,
    /// Skip the first row of the keyword file
    pub keys_header: bool,
    /// Log progress messages
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            setup_file: None,
            origin_directory: PathBuf::from("2019 Combined Cleaned Transcriptions"),
            save_directory: PathBuf::from("results"),
            save_file: "word_counts_final.csv".to_string(),
            keys_file: PathBuf::from("NEW keywords.csv"),
            keys_header: false,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WordCountError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| WordCountError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reject file names without the .csv extension before any I/O happens
    pub fn validate(&self) -> Result<()> {
        if !self.save_file.ends_with(TABLE_EXTENSION) {
            return Err(WordCountError::Config(format!(
                "save file must be a {} file; got {}",
                TABLE_EXTENSION, self.save_file
            )));
        }
        let keys = self.keys_file.to_string_lossy();
        if !keys.ends_with(TABLE_EXTENSION) {
            return Err(WordCountError::Config(format!(
                "keys file must be a {} file; got {}",
                TABLE_EXTENSION, keys
            )));
        }
        Ok(())
    }

    /// Where the results table is written
    pub fn save_path(&self) -> PathBuf {
        self.save_directory.join(&self.save_file)
    }

    /// Whether documents are parsed, as opposed to reloading a setup file
    pub fn parses_documents(&self) -> bool {
        self.setup_file.is_none()
    }
}
