use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use transcount::{PromptPaths, PromptSelection, RunConfig, resolve_paths, run};

#[derive(Parser)]
#[command(name = "transcount")]
#[command(author, version, about = "Per-page word counts and keyword tallies for parent/child transcripts", long_about = None)]
struct Cli {
    /// Prompt for the directory holding the .docx transcripts
    #[arg(short = 'o', long)]
    prompt_origin: bool,

    /// Prompt for the directory the results are saved to
    #[arg(short = 's', long)]
    prompt_save: bool,

    /// Prompt for the keyword file (csv with search queries)
    #[arg(short = 'k', long)]
    prompt_keys: bool,

    /// Prompt for a setup file (csv with previous results) instead of parsing
    #[arg(short = 'r', long)]
    prompt_setup: bool,

    /// Previously saved results; skips parsing the transcripts
    #[arg(long)]
    setup_file: Option<PathBuf>,

    /// Directory to search for the .docx files
    #[arg(long)]
    origin_directory: Option<PathBuf>,

    /// Directory the results will be saved to
    #[arg(long)]
    save_directory: Option<PathBuf>,

    /// CSV file to save the results to
    #[arg(long)]
    save_file: Option<String>,

    /// CSV file with search queries
    #[arg(long)]
    keys_file: Option<PathBuf>,

    /// Skip the first row of the keyword file
    #[arg(long)]
    keys_header: bool,

    /// JSON file with run settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn selection(&self) -> PromptSelection {
        PromptSelection {
            origin: self.prompt_origin,
            save: self.prompt_save,
            keys: self.prompt_keys,
            setup: self.prompt_setup,
        }
    }

    /// Start from the config file (or defaults) and apply explicit flags
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?,
            None => RunConfig::default(),
        };

        if let Some(setup_file) = &self.setup_file {
            config.setup_file = Some(setup_file.clone());
        }
        if let Some(origin) = &self.origin_directory {
            config.origin_directory = origin.clone();
        }
        if let Some(save_directory) = &self.save_directory {
            config.save_directory = save_directory.clone();
        }
        if let Some(save_file) = &self.save_file {
            config.save_file = save_file.clone();
        }
        if let Some(keys_file) = &self.keys_file {
            config.keys_file = keys_file.clone();
        }
        config.keys_header |= self.keys_header;
        config.verbose |= self.verbose;

        // The setup file may come from --config as well as from the flag
        if config.setup_file.is_some() && self.origin_directory.is_some() {
            bail!("a setup file and --origin-directory are mutually exclusive");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.run_config()?;
    setup_logging(config.verbose);

    // Validate file names before asking the user anything
    config.validate()?;

    let selection = cli.selection();
    let config = if selection == PromptSelection::default() {
        config
    } else {
        let stdin = io::stdin();
        let mut prompter = PromptPaths::new(stdin.lock(), io::stdout());
        resolve_paths(config, selection, &mut prompter).context("Failed to resolve paths")?
    };

    let outcome = run(&config).context("Word count run failed")?;

    if let Some(parse) = &outcome.parse {
        info!(
            "Parsed {} documents ({} other entries skipped, {} stop pages)",
            parse.documents, parse.skipped_entries, parse.stop_pages
        );
    }
    info!(
        "Tallied {} queries over {} pages",
        outcome.tally.queries, outcome.rows
    );
    info!("Done: {}", outcome.save_path.display());

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("transcount").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_setup_file_flag_conflicts_with_origin() {
        let result = cli(&["--setup-file", "old.csv", "--origin-directory", "docs"]).run_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_setup_file_from_config_conflicts_with_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"setup_file": "results/old.csv"}"#).unwrap();
        let config = path.to_str().unwrap();

        let result = cli(&["--config", config, "--origin-directory", "docs"]).run_config();
        assert!(result.is_err());

        let merged = cli(&["--config", config]).run_config().unwrap();
        assert_eq!(merged.setup_file, Some(PathBuf::from("results/old.csv")));
    }
}
