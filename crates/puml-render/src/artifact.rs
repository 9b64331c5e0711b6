//! `PlantUML` jar fetching.
//!
//! The jar is cached at `<jar_dir>/.plantuml-<version>.jar`. [`JarFetcher`]
//! checks for it at the start of a run and downloads it only when missing.
//! Downloads land in a uniquely named `.part` file next to the jar and are
//! persisted into place once complete (and verified, when a SHA-256 is
//! pinned), so a partial download is never mistaken for a cached jar.
//! Concurrent hook runs each download into their own temporary file; the
//! first to finish stores the jar and the others report it as present.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tempfile::{Builder, NamedTempFile};
use ureq::Agent;

use crate::error::FetchError;

/// Download location used when no template is configured.
const DEFAULT_URL_TEMPLATE: &str =
    "https://github.com/plantuml/plantuml/releases/download/v{version}/plantuml-{version}.jar";

/// Immutable description of the jar to use for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    version: String,
    jar_dir: PathBuf,
    url_template: String,
    sha256: Option<String>,
}

impl ArtifactSpec {
    /// Describe the jar for `version`, cached in `jar_dir`.
    pub fn new(version: impl Into<String>, jar_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            jar_dir: jar_dir.into(),
            url_template: DEFAULT_URL_TEMPLATE.to_owned(),
            sha256: None,
        }
    }

    /// Use a different download URL template. `{version}` is substituted.
    #[must_use]
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Pin the expected SHA-256 (hex) of the downloaded jar.
    #[must_use]
    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256.map(|s| s.to_ascii_lowercase());
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Cached jar filename, e.g. `.plantuml-1.2022.5.jar`.
    pub fn file_name(&self) -> String {
        format!(".plantuml-{}.jar", self.version)
    }

    /// Full path of the cached jar.
    pub fn path(&self) -> PathBuf {
        self.jar_dir.join(self.file_name())
    }

    /// Download URL for this version.
    pub fn download_url(&self) -> String {
        self.url_template.replace("{version}", &self.version)
    }

}

/// Transport used to retrieve the jar.
///
/// [`HttpDownloader`] is the production implementation; tests substitute
/// doubles to observe network access.
pub trait Downloader {
    /// Stream the resource at `url` into `sink`, returning bytes written.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

/// HTTP(S) downloader backed by a `ureq` agent.
pub struct HttpDownloader {
    agent: Agent,
}

impl HttpDownloader {
    /// Create a downloader whose whole request must finish within `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let network_error = |message: String| FetchError::Network {
            url: url.to_owned(),
            message,
        };

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| network_error(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(network_error(format!("HTTP {status}")));
        }

        let mut reader = response.into_body().into_reader();
        io::copy(&mut reader, sink).map_err(|e| network_error(e.to_string()))
    }
}

/// Result of [`JarFetcher::ensure_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The jar was already cached, or a concurrent run stored it first.
    Present,
    /// The jar was downloaded during this call.
    Downloaded { bytes: u64 },
}

/// Makes sure the jar described by an [`ArtifactSpec`] exists locally.
pub struct JarFetcher<D> {
    spec: ArtifactSpec,
    downloader: D,
}

impl<D: Downloader> JarFetcher<D> {
    pub fn new(spec: ArtifactSpec, downloader: D) -> Self {
        Self { spec, downloader }
    }

    pub fn spec(&self) -> &ArtifactSpec {
        &self.spec
    }

    /// Download the jar unless it is already cached.
    ///
    /// Never touches the network when the jar exists. No retries: the first
    /// failure is returned.
    pub fn ensure_available(&self) -> Result<FetchOutcome, FetchError> {
        let path = self.spec.path();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "PlantUML jar already present");
            return Ok(FetchOutcome::Present);
        }

        let url = self.spec.download_url();
        tracing::info!(%url, "Downloading PlantUML {}", self.spec.version());

        // Dropping the temporary file on any early return removes it.
        let (partial, bytes) = self.download_to(&url)?;

        match partial.persist_noclobber(&path) {
            Ok(_) => {}
            Err(_) if path.is_file() => {
                tracing::debug!(path = %path.display(), "PlantUML jar stored by another run");
                return Ok(FetchOutcome::Present);
            }
            Err(err) => {
                return Err(FetchError::Io {
                    path,
                    source: err.error,
                });
            }
        }

        tracing::info!(path = %path.display(), bytes, "PlantUML jar stored");
        Ok(FetchOutcome::Downloaded { bytes })
    }

    fn download_to(&self, url: &str) -> Result<(NamedTempFile, u64), FetchError> {
        let dir = &self.spec.jar_dir;
        let io_error = |source: io::Error| FetchError::Io {
            path: dir.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(io_error)?;

        let file = Builder::new()
            .prefix(&format!("{}.", self.spec.file_name()))
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(io_error)?;
        let mut sink = HashingWriter::new(file);
        let bytes = self.downloader.download(url, &mut sink)?;
        let (file, digest) = sink.finish();
        file.as_file().sync_all().map_err(io_error)?;

        if let Some(expected) = &self.spec.sha256
            && *expected != digest
        {
            return Err(FetchError::Checksum {
                expected: expected.clone(),
                actual: digest,
            });
        }

        Ok((file, bytes))
    }
}

/// Writer that hashes everything passing through it.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Return the inner writer and the hex digest of the bytes written.
    fn finish(self) -> (W, String) {
        (self.inner, hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
