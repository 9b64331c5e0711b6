//! Rendering tool invocation.
//!
//! [`ToolRunner`] abstracts subprocess execution so the converter can be
//! tested without a JVM. [`ProcessRunner`] is the real thing.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

use crate::format::OutputFormat;

/// A single command line for the rendering tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// `<java> -jar <jar> -T<ext> -o <output_dir> <input>`
    pub fn plantuml(
        java: impl AsRef<OsStr>,
        jar: &Path,
        format: &OutputFormat,
        output_dir: &Path,
        input: &Path,
    ) -> Self {
        Self {
            program: java.as_ref().to_os_string(),
            args: vec![
                OsString::from("-jar"),
                jar.as_os_str().to_os_string(),
                OsString::from(format.flag()),
                OsString::from("-o"),
                output_dir.as_os_str().to_os_string(),
                input.as_os_str().to_os_string(),
            ],
        }
    }

    /// Program name for log and error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Exit status of a finished invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl RunStatus {
    pub const SUCCESS: Self = Self {
        success: true,
        code: Some(0),
    };

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Runs the rendering tool and waits for it to exit.
pub trait ToolRunner {
    /// Run `invocation` to completion.
    ///
    /// `Err` means the process could not be started; a started process that
    /// fails is reported through [`RunStatus`].
    fn run(&self, invocation: &Invocation) -> std::io::Result<RunStatus>;
}

/// Runs the tool as a child process with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RunStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()?;
        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}
