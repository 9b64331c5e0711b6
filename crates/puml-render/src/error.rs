//! Error types for jar fetching and diagram conversion.

use std::path::PathBuf;

/// Failure to make the `PlantUML` jar available locally.
///
/// Always fatal for a run: no file is converted after a fetch error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or HTTP error status.
    #[error("failed to download {url}: {message}")]
    Network { url: String, message: String },
    /// Local filesystem failure while storing the jar.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Downloaded bytes do not match the pinned SHA-256.
    #[error("checksum mismatch for downloaded jar: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },
}

/// Failure converting a single diagram file.
///
/// Recorded in the [`ConversionReport`](crate::ConversionReport); never stops
/// the remaining files from being processed.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("renderer exited with status {code}")]
    Exit { code: i32 },
    #[error("renderer terminated by signal")]
    Signal,
}

/// Run-level conversion error.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Invalid output extension.
#[derive(Debug, thiserror::Error)]
#[error("invalid output extension '{value}': {reason}")]
pub struct FormatError {
    pub value: String,
    pub reason: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_message_with_code() {
        let err = FileError::Exit { code: 2 };
        assert_eq!(err.to_string(), "renderer exited with status 2");
    }

    #[test]
    fn test_exit_message_signal() {
        let err = FileError::Signal;
        assert_eq!(err.to_string(), "renderer terminated by signal");
    }

    #[test]
    fn test_fetch_error_is_transparent_in_convert_error() {
        let err = ConvertError::from(FetchError::Network {
            url: "https://example.com/plantuml.jar".to_owned(),
            message: "HTTP 404".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "failed to download https://example.com/plantuml.jar: HTTP 404"
        );
    }
}
