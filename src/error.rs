//! CLI error types.

use puml_config::ConfigError;
use puml_render::{ConvertError, FormatError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{0} diagram(s) failed to convert")]
    Failures(usize),
}
