//! `PlantUML` diagram conversion for the pre-commit hook.
//!
//! Rendering is delegated to the `PlantUML` jar, run as a `java` subprocess.
//! This crate makes sure the jar is present and drives one subprocess per
//! diagram file:
//!
//! - [`JarFetcher`] downloads the versioned jar once and caches it on disk
//! - [`OutputPolicy`] decides where each file's images are written
//! - [`ToolRunner`] runs the tool ([`ProcessRunner`] in production)
//! - [`Converter`] ties it together and reports per-file outcomes
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use puml_render::{
//!     ArtifactSpec, ConversionRequest, Converter, HttpDownloader, JarFetcher, OutputFormat,
//!     OutputPolicy, ProcessRunner,
//! };
//!
//! let cwd = std::env::current_dir().unwrap();
//! let spec = ArtifactSpec::new("1.2022.5", &cwd);
//! let fetcher = JarFetcher::new(spec, HttpDownloader::new(Duration::from_secs(300)));
//! let converter = Converter::new(fetcher, ProcessRunner, cwd);
//!
//! let request = ConversionRequest::new(
//!     vec!["docs/sequence.puml".into()],
//!     OutputFormat::parse("svg").unwrap(),
//!     OutputPolicy::parse("./images"),
//! );
//! let report = converter.convert(&request).unwrap();
//! assert!(report.is_success());
//! ```

mod artifact;
mod converter;
mod error;
mod format;
mod output;
mod runner;

pub use artifact::{ArtifactSpec, Downloader, FetchOutcome, HttpDownloader, JarFetcher};
pub use converter::{ConversionReport, ConversionRequest, Converter, FileOutcome, FileStatus};
pub use error::{ConvertError, FetchError, FileError, FormatError};
pub use format::OutputFormat;
pub use output::{OutputPolicy, resolve};
pub use runner::{Invocation, ProcessRunner, RunStatus, ToolRunner};
