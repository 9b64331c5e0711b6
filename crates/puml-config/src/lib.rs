//! Configuration management for the PlantUML pre-commit hook.
//!
//! Parses `puml.toml` with serde and discovers it in the current directory or
//! any parent. Every setting has a built-in default, so running without a
//! config file behaves exactly like the plain hook:
//!
//! ```toml
//! [plantuml]
//! version = "1.2022.5"
//! jar_dir = "."
//! download_url = "https://github.com/plantuml/plantuml/releases/download/v{version}/plantuml-{version}.jar"
//! java = "java"
//!
//! [output]
//! directory = "./images"
//! extension = "svg"
//! ```
//!
//! CLI arguments are layered on top via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `plantuml.download_url`, `plantuml.java` and `output.directory` accept
//! `${VAR}` and `${VAR:-default}` references.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "puml.toml";

/// `PlantUML` release used when nothing else is configured.
pub const DEFAULT_PLANTUML_VERSION: &str = "1.2022.5";

/// Release download location; `{version}` is substituted at fetch time.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://github.com/plantuml/plantuml/releases/download/v{version}/plantuml-{version}.jar";

/// Default output directory policy.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "./images";

/// Default output extension.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "svg";

/// Default timeout for the artifact download.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// CLI settings that override configuration file values.
///
/// Only `Some` values take effect.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `output.directory`.
    pub output_directory: Option<String>,
    /// Override `output.extension`.
    pub output_extension: Option<String>,
    /// Override `plantuml.version`.
    pub plantuml_version: Option<String>,
}

/// Hook configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering tool settings as written in TOML.
    plantuml: PlantUmlConfigRaw,
    /// Output settings.
    pub output: OutputConfig,

    /// Resolved rendering tool settings (set after loading).
    #[serde(skip)]
    pub plantuml_resolved: PlantUmlConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw `[plantuml]` section (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PlantUmlConfigRaw {
    version: Option<String>,
    jar_dir: Option<String>,
    download_url: Option<String>,
    sha256: Option<String>,
    java: Option<String>,
    download_timeout_secs: Option<u64>,
}

/// Resolved rendering tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantUmlConfig {
    /// `PlantUML` release version.
    pub version: String,
    /// Directory holding the cached jar.
    pub jar_dir: PathBuf,
    /// Download URL template containing `{version}`.
    pub download_url: String,
    /// Expected SHA-256 of the jar, lowercase hex.
    pub sha256: Option<String>,
    /// Java launcher.
    pub java: String,
    /// Download timeout in seconds.
    pub download_timeout_secs: u64,
}

impl PlantUmlConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            version: DEFAULT_PLANTUML_VERSION.to_owned(),
            jar_dir: base.to_path_buf(),
            download_url: DEFAULT_DOWNLOAD_URL.to_owned(),
            sha256: None,
            java: "java".to_owned(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl Default for PlantUmlConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory policy: `@` or a project-relative directory.
    pub directory: String,
    /// Output extension passed to the tool as `-T<extension>`.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIRECTORY.to_owned(),
            extension: DEFAULT_OUTPUT_EXTENSION.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`plantuml.java`").
        field: String,
        /// Error message (e.g., "${`JAVA_HOME`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI overrides.
    ///
    /// Uses `config_path` when given, otherwise searches for `puml.toml` in
    /// the current directory and its parents, falling back to defaults rooted
    /// at the current directory.
    ///
    /// CLI settings are applied last and validated together with the file.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(directory) = &settings.output_directory {
            self.output.directory.clone_from(directory);
        }
        if let Some(extension) = &settings.output_extension {
            self.output.extension.clone_from(extension);
        }
        if let Some(version) = &settings.plantuml_version {
            self.plantuml_resolved.version.clone_from(version);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with the jar cached under `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            plantuml: PlantUmlConfigRaw::default(),
            output: OutputConfig::default(),
            plantuml_resolved: PlantUmlConfig::with_base(base),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_plantuml()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_plantuml(&self) -> Result<(), ConfigError> {
        let plantuml = &self.plantuml_resolved;

        require_non_empty(&plantuml.version, "plantuml.version")?;
        if plantuml.version.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "plantuml.version cannot contain path separators".to_owned(),
            ));
        }
        require_non_empty(&plantuml.java, "plantuml.java")?;

        require_http_url(&plantuml.download_url, "plantuml.download_url")?;
        if !plantuml.download_url.contains("{version}") {
            return Err(ConfigError::Validation(
                "plantuml.download_url must contain a {version} placeholder".to_owned(),
            ));
        }

        if let Some(sha256) = &plantuml.sha256
            && (sha256.len() != 64 || !sha256.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(ConfigError::Validation(
                "plantuml.sha256 must be 64 hexadecimal characters".to_owned(),
            ));
        }

        if plantuml.download_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "plantuml.download_timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.output.directory, "output.directory")?;
        require_non_empty(&self.output.extension, "output.extension")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.plantuml.download_url {
            self.plantuml.download_url = Some(expand::expand_env(url, "plantuml.download_url")?);
        }
        if let Some(ref java) = self.plantuml.java {
            self.plantuml.java = Some(expand::expand_env(java, "plantuml.java")?);
        }
        self.output.directory = expand::expand_env(&self.output.directory, "output.directory")?;
        Ok(())
    }

    /// Fill in resolved `[plantuml]` values, joining `jar_dir` onto the
    /// config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.plantuml;
        let defaults = PlantUmlConfig::with_base(config_dir);

        self.plantuml_resolved = PlantUmlConfig {
            version: raw.version.clone().unwrap_or(defaults.version),
            jar_dir: raw
                .jar_dir
                .as_deref()
                .map_or(defaults.jar_dir, |dir| config_dir.join(dir)),
            download_url: raw.download_url.clone().unwrap_or(defaults.download_url),
            sha256: raw.sha256.as_ref().map(|s| s.to_ascii_lowercase()),
            java: raw.java.clone().unwrap_or(defaults.java),
            download_timeout_secs: raw
                .download_timeout_secs
                .unwrap_or(defaults.download_timeout_secs),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/repo"));
        assert_eq!(config.output.directory, "./images");
        assert_eq!(config.output.extension, "svg");
        assert_eq!(config.plantuml_resolved.version, "1.2022.5");
        assert_eq!(config.plantuml_resolved.jar_dir, PathBuf::from("/repo"));
        assert_eq!(config.plantuml_resolved.java, "java");
        assert!(config.plantuml_resolved.sha256.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_parse_output_section() {
        let toml = r#"
[output]
directory = "@"
extension = "png"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.directory, "@");
        assert_eq!(config.output.extension, "png");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[plantuml]
version = "1.2024.3"
jar_dir = ".cache"
java = "/opt/java/bin/java"
sha256 = "ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789"
download_timeout_secs = 30
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.plantuml_resolved,
            PlantUmlConfig {
                version: "1.2024.3".to_owned(),
                jar_dir: PathBuf::from("/project/.cache"),
                download_url: DEFAULT_DOWNLOAD_URL.to_owned(),
                sha256: Some(
                    "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789".to_owned()
                ),
                java: "/opt/java/bin/java".to_owned(),
                download_timeout_secs: 30,
            }
        );
    }

    #[test]
    fn test_resolve_paths_defaults_jar_dir_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.plantuml_resolved.jar_dir, PathBuf::from("/project"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings {
            output_directory: Some("@".to_owned()),
            output_extension: Some("png".to_owned()),
            plantuml_version: Some("1.2023.1".to_owned()),
        });

        assert_eq!(config.output.directory, "@");
        assert_eq!(config.output.extension, "png");
        assert_eq!(config.plantuml_resolved.version, "1.2023.1");
    }

    #[test]
    fn test_apply_cli_settings_empty_keeps_values() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.plantuml_resolved.version, DEFAULT_PLANTUML_VERSION);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/puml.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("puml.toml");
        std::fs::write(
            &path,
            "[plantuml]\njar_dir = \"tools\"\n\n[output]\nextension = \"png\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.plantuml_resolved.jar_dir, dir.path().join("tools"));
        assert_eq!(config.output.extension, "png");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("puml.toml");
        std::fs::write(&path, "[output]\ndirectory = \"docs/img\"\n").unwrap();

        let settings = CliSettings {
            output_directory: Some("@".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.output.directory, "@");
    }

    #[test]
    fn test_load_rejects_empty_cli_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("puml.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            output_extension: Some(String::new()),
            ..CliSettings::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(err.to_string().contains("output.extension"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("puml.toml");
        std::fs::write(&path, "[output\n").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_expand_env_vars_java() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("PUML_CONFIG_TEST_JAVA_HOME", "/opt/jdk");
        }
        let toml = r#"
[plantuml]
java = "${PUML_CONFIG_TEST_JAVA_HOME}/bin/java"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.plantuml_resolved.java, "/opt/jdk/bin/java");
        unsafe {
            std::env::remove_var("PUML_CONFIG_TEST_JAVA_HOME");
        }
    }

    /// Assert that validation fails with all expected substrings.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_download_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.plantuml_resolved.download_url = "ftp://example.com/{version}.jar".to_owned();
        assert_validation_error(&config, &["plantuml.download_url", "http"]);
    }

    #[test]
    fn test_validate_download_url_placeholder() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.plantuml_resolved.download_url = "https://example.com/plantuml.jar".to_owned();
        assert_validation_error(&config, &["{version}"]);
    }

    #[test]
    fn test_validate_sha256_length() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.plantuml_resolved.sha256 = Some("abc".to_owned());
        assert_validation_error(&config, &["plantuml.sha256"]);
    }

    #[test]
    fn test_validate_version_separators() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.plantuml_resolved.version = "../evil".to_owned();
        assert_validation_error(&config, &["plantuml.version"]);
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.plantuml_resolved.download_timeout_secs = 0;
        assert_validation_error(&config, &["download_timeout_secs"]);
    }

    #[test]
    fn test_validate_empty_output_directory() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.output.directory = "  ".to_owned();
        assert_validation_error(&config, &["output.directory"]);
    }
}
