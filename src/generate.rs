//! Hook command: render the given diagram files.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use puml_config::{CliSettings, Config};
use puml_render::{
    ArtifactSpec, ConversionReport, ConversionRequest, Converter, FetchOutcome, FileStatus,
    HttpDownloader, JarFetcher, OutputFormat, OutputPolicy, ProcessRunner,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the hook.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Diagram files to render.
    #[arg(required = true)]
    file_paths: Vec<PathBuf>,

    /// Output directory relative to the working directory, or "@" to write
    /// images next to each diagram (default: ./images).
    #[arg(long)]
    output_directory: Option<String>,

    /// Output format passed to PlantUML as -T<extension> (default: svg).
    #[arg(long)]
    output_extension: Option<String>,

    /// PlantUML release to download and run (overrides config).
    #[arg(long, env = "PUML_PLANTUML_VERSION")]
    plantuml_version: Option<String>,

    /// Path to configuration file (default: auto-discover puml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with an error when any diagram fails to render.
    #[arg(long)]
    strict: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            output_directory: self.output_directory,
            output_extension: self.output_extension,
            plantuml_version: self.plantuml_version,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        match &config.config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Loaded configuration"),
            None => tracing::debug!("No puml.toml found, using defaults"),
        }

        let format = OutputFormat::parse(&config.output.extension)?;
        if !format.is_known() {
            tracing::warn!(extension = %format, "Output extension is not a documented PlantUML format");
        }
        let policy = OutputPolicy::parse(&config.output.directory);

        let plantuml = &config.plantuml_resolved;
        let spec = ArtifactSpec::new(&plantuml.version, &plantuml.jar_dir)
            .with_url_template(&plantuml.download_url)
            .with_sha256(plantuml.sha256.clone());
        let downloader = HttpDownloader::new(Duration::from_secs(plantuml.download_timeout_secs));
        let cwd = std::env::current_dir()?;
        let converter = Converter::new(JarFetcher::new(spec, downloader), ProcessRunner, cwd)
            .with_java(&plantuml.java);

        tracing::debug!(
            output_directory = %config.output.directory,
            output_extension = %format,
            files = ?self.file_paths,
            "Running hook"
        );

        let request = ConversionRequest::new(self.file_paths, format, policy);
        let report = converter.convert(&request)?;
        print_report(output, &report);

        if self.strict && !report.is_success() {
            return Err(CliError::Failures(report.failure_count()));
        }
        Ok(())
    }
}

fn print_report(output: &Output, report: &ConversionReport) {
    if let FetchOutcome::Downloaded { bytes } = report.fetch {
        output.info(&format!("Downloaded PlantUML ({bytes} bytes)"));
    }

    for outcome in report.failures() {
        if let FileStatus::Failed(error) = &outcome.status {
            output.file_failure(&outcome.input, error);
        }
    }

    let summary = summary_line(report);
    if report.is_success() {
        output.success(&summary);
    } else {
        output.warning(&summary);
    }
}

/// One-line run summary.
fn summary_line(report: &ConversionReport) -> String {
    let total = report.outcomes.len();
    let failed = report.failure_count();
    if failed == 0 {
        format!("Rendered {total} diagram(s)")
    } else {
        format!("{failed} of {total} diagram(s) failed to render")
    }
}
