//! Output format passed to `PlantUML` as `-T<extension>`.

use std::fmt;

use crate::error::FormatError;

/// Formats `PlantUML` documents for its `-T` option.
const KNOWN_FORMATS: &[&str] = &[
    "svg",
    "png",
    "eps",
    "epstext",
    "pdf",
    "vdx",
    "xmi",
    "scxml",
    "html",
    "txt",
    "utxt",
    "latex",
    "latex:nopreamble",
    "braille",
];

/// Output extension for rendered diagrams.
///
/// Unknown extensions are accepted; `PlantUML` itself decides whether it can
/// produce them. Use [`OutputFormat::is_known`] to warn about likely typos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat(String);

impl OutputFormat {
    /// Parse an extension such as `svg` or `png`.
    ///
    /// Rejects values that would not survive as a single `-T` argument: empty
    /// strings, whitespace, and a leading `-`.
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        let reason = if value.is_empty() {
            Some("extension is empty")
        } else if value.chars().any(char::is_whitespace) {
            Some("extension contains whitespace")
        } else if value.starts_with('-') {
            Some("extension starts with '-'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(FormatError {
                value: value.to_owned(),
                reason,
            }),
            None => Ok(Self(value.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `PlantUML` documents this format.
    pub fn is_known(&self) -> bool {
        KNOWN_FORMATS.contains(&self.0.as_str())
    }

    /// The `-T<extension>` flag.
    pub fn flag(&self) -> String {
        format!("-T{}", self.0)
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self("svg".to_owned())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
