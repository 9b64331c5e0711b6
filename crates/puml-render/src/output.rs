//! Output directory resolution.
//!
//! Each diagram's images go either next to the diagram ([`OutputPolicy::CoLocate`],
//! written `@` on the command line) or into one project-relative directory
//! ([`OutputPolicy::Fixed`]).

use std::path::{Component, Path, PathBuf};

/// Marker selecting [`OutputPolicy::CoLocate`].
const CO_LOCATE_MARKER: &str = "@";

/// Where rendered images are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Same directory as the source diagram.
    CoLocate,
    /// A single directory relative to the working directory.
    Fixed(PathBuf),
}

impl OutputPolicy {
    /// Parse the `--output-directory` value: `@` or a directory path.
    pub fn parse(value: &str) -> Self {
        if value == CO_LOCATE_MARKER {
            Self::CoLocate
        } else {
            Self::Fixed(PathBuf::from(value))
        }
    }
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self::Fixed(PathBuf::from("./images"))
    }
}

/// Resolve the output directory for `input_file` against `cwd`.
///
/// Pure: never touches the filesystem.
pub fn resolve(policy: &OutputPolicy, input_file: &Path, cwd: &Path) -> PathBuf {
    match policy {
        OutputPolicy::CoLocate => {
            let source = cwd.join(input_file);
            source.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf)
        }
        OutputPolicy::Fixed(dir) => {
            let relative: PathBuf = dir
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if relative.as_os_str().is_empty() {
                cwd.to_path_buf()
            } else {
                cwd.join(relative)
            }
        }
    }
}
