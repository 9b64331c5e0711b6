//! Batch diagram conversion.
//!
//! [`Converter::convert`] fetches the jar (at most once), then renders each
//! input file in order, one blocking subprocess at a time. A failing file is
//! recorded in the [`ConversionReport`] and the remaining files are still
//! processed. Only a fetch failure aborts the run.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::{Downloader, FetchOutcome, JarFetcher};
use crate::error::{ConvertError, FileError};
use crate::format::OutputFormat;
use crate::output::{OutputPolicy, resolve};
use crate::runner::{Invocation, ToolRunner};

/// What to convert and where to put the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    files: Vec<PathBuf>,
    format: OutputFormat,
    policy: OutputPolicy,
}

impl ConversionRequest {
    pub fn new(files: Vec<PathBuf>, format: OutputFormat, policy: OutputPolicy) -> Self {
        Self {
            files,
            format,
            policy,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    pub fn policy(&self) -> &OutputPolicy {
        &self.policy
    }
}

/// Per-file result.
#[derive(Debug)]
pub enum FileStatus {
    Converted,
    Failed(FileError),
}

/// Outcome of converting one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Converted)
    }
}

/// Outcomes for a whole run, in input order.
#[derive(Debug)]
pub struct ConversionReport {
    pub fetch: FetchOutcome,
    pub outcomes: Vec<FileOutcome>,
}

impl ConversionReport {
    /// Outcomes of files that failed to convert.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn converted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.converted_count()
    }

    /// True when every file converted.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_success)
    }
}

/// Converts diagram files by running `PlantUML` once per file.
pub struct Converter<D, R> {
    fetcher: JarFetcher<D>,
    runner: R,
    java: OsString,
    cwd: PathBuf,
}

impl<D: Downloader, R: ToolRunner> Converter<D, R> {
    /// Create a converter resolving relative paths against `cwd`.
    pub fn new(fetcher: JarFetcher<D>, runner: R, cwd: PathBuf) -> Self {
        Self {
            fetcher,
            runner,
            java: OsString::from("java"),
            cwd,
        }
    }

    /// Use a specific Java launcher instead of `java` on `PATH`.
    #[must_use]
    pub fn with_java(mut self, java: impl Into<OsString>) -> Self {
        self.java = java.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Convert every file in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Fetch`] when the jar is missing and cannot be
    /// downloaded. Per-file failures are reported in the returned
    /// [`ConversionReport`], not as errors.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionReport, ConvertError> {
        let fetch = self.fetcher.ensure_available()?;
        let jar = self.fetcher.spec().path();

        tracing::debug!(
            files = request.files().len(),
            format = %request.format(),
            policy = ?request.policy(),
            "Running conversion"
        );

        let outcomes = request
            .files()
            .iter()
            .map(|input| self.convert_file(&jar, request, input))
            .collect();

        Ok(ConversionReport { fetch, outcomes })
    }

    fn convert_file(&self, jar: &Path, request: &ConversionRequest, input: &Path) -> FileOutcome {
        let output_dir = resolve(request.policy(), input, &self.cwd);
        tracing::debug!(
            input = %input.display(),
            output_dir = %output_dir.display(),
            "Resolved output directory"
        );

        let status = match self.render(jar, request.format(), &output_dir, input) {
            Ok(()) => {
                tracing::debug!(input = %input.display(), "Finished processing");
                FileStatus::Converted
            }
            Err(error) => {
                tracing::warn!(input = %input.display(), error = %error, "Conversion failed");
                FileStatus::Failed(error)
            }
        };

        FileOutcome {
            input: input.to_path_buf(),
            output_dir,
            status,
        }
    }

    fn render(
        &self,
        jar: &Path,
        format: &OutputFormat,
        output_dir: &Path,
        input: &Path,
    ) -> Result<(), FileError> {
        ensure_output_dir(output_dir)?;

        let invocation = Invocation::plantuml(&self.java, jar, format, output_dir, input);
        tracing::debug!(input = %input.display(), "Processing");

        let status = self
            .runner
            .run(&invocation)
            .map_err(|source| FileError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        match (status.success, status.code) {
            (true, _) => Ok(()),
            (false, Some(code)) => Err(FileError::Exit { code }),
            (false, None) => Err(FileError::Signal),
        }
    }
}

/// Create `dir` unless it exists. Parents are not created.
fn ensure_output_dir(dir: &Path) -> Result<(), FileError> {
    if dir.is_dir() {
        return Ok(());
    }
    tracing::debug!(path = %dir.display(), "Output directory did not exist, creating");
    fs::create_dir(dir).map_err(|source| FileError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
