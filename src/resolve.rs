use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RunConfig;
use crate::error::{Result, WordCountError};

/// A path the run needs before it can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRequest {
    OriginDirectory,
    SaveDirectory,
    KeysFile,
    SetupFile,
}

impl PathRequest {
    pub fn title(self) -> &'static str {
        match self {
            Self::OriginDirectory => "Select the folder with your .docx files",
            Self::SaveDirectory => "Select the folder to save results to",
            Self::KeysFile => "Select a csv file containing your keywords",
            Self::SetupFile => "Select a csv file containing previous results",
        }
    }

    /// Whether the answer has to exist before the run starts
    fn must_exist(self) -> bool {
        !matches!(self, Self::SaveDirectory)
    }

    fn is_directory(self) -> bool {
        matches!(self, Self::OriginDirectory | Self::SaveDirectory)
    }
}

/// Source of the paths a run works on
pub trait PathResolver {
    /// Resolve `request`, with `current` as the configured value
    fn resolve(&mut self, request: PathRequest, current: &Path) -> Result<PathBuf>;
}

/// Uses the configured paths as they are
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitPaths;

impl PathResolver for ExplicitPaths {
    fn resolve(&mut self, _request: PathRequest, current: &Path) -> Result<PathBuf> {
        Ok(current.to_path_buf())
    }
}

/// Asks for each path on a terminal, offering the configured value as default
pub struct PromptPaths<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPaths<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn check(request: PathRequest, path: &Path) -> std::result::Result<(), String> {
        if !request.must_exist() {
            return Ok(());
        }
        if request.is_directory() && !path.is_dir() {
            return Err(format!("{} is not a directory", path.display()));
        }
        if !request.is_directory() && !path.is_file() {
            return Err(format!("{} is not a file", path.display()));
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> PathResolver for PromptPaths<R, W> {
    fn resolve(&mut self, request: PathRequest, current: &Path) -> Result<PathBuf> {
        let terminal = |e: std::io::Error| WordCountError::io("<terminal>", e);
        loop {
            write!(self.output, "{} [{}]: ", request.title(), current.display()).map_err(terminal)?;
            self.output.flush().map_err(terminal)?;

            let mut line = String::new();
            if self.input.read_line(&mut line).map_err(terminal)? == 0 {
                return Err(WordCountError::Config(format!(
                    "no answer given for: {}",
                    request.title()
                )));
            }

            let answer = line.trim();
            let path = if answer.is_empty() {
                current.to_path_buf()
            } else {
                PathBuf::from(answer)
            };

            match Self::check(request, &path) {
                Ok(()) => {
                    debug!("{:?} resolved to {:?}", request, path);
                    return Ok(path);
                }
                Err(message) => writeln!(self.output, "{}", message).map_err(terminal)?,
            }
        }
    }
}

/// Which paths to ask for instead of taking them from the configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PromptSelection {
    pub origin: bool,
    pub save: bool,
    pub keys: bool,
    pub setup: bool,
}

/// Fill in the configured paths, prompting for the selected ones
///
/// Asking for a setup file switches the run to reloading results, so the
/// origin and save directories are then left as configured.
pub fn resolve_paths(
    mut config: RunConfig,
    selection: PromptSelection,
    prompter: &mut dyn PathResolver,
) -> Result<RunConfig> {
    if selection.setup {
        let current = config.setup_file.clone().unwrap_or_else(|| config.save_path());
        config.setup_file = Some(prompter.resolve(PathRequest::SetupFile, &current)?);
    }
    let reloading = !config.parses_documents();

    config.origin_directory = resolve_one(
        prompter,
        selection.origin && !reloading,
        PathRequest::OriginDirectory,
        &config.origin_directory,
    )?;
    config.save_directory = resolve_one(
        prompter,
        selection.save && !reloading,
        PathRequest::SaveDirectory,
        &config.save_directory,
    )?;
    config.keys_file = resolve_one(
        prompter,
        selection.keys,
        PathRequest::KeysFile,
        &config.keys_file,
    )?;

    Ok(config)
}

fn resolve_one(
    prompter: &mut dyn PathResolver,
    prompt: bool,
    request: PathRequest,
    current: &Path,
) -> Result<PathBuf> {
    if prompt {
        prompter.resolve(request, current)
    } else {
        ExplicitPaths.resolve(request, current)
    }
}
