//! External tool invocation.
//!
//! Every executable the pipeline drives (exporter, upload tool) goes through a
//! [`ToolRunner`]. Calls block until the child exits and inherit the
//! terminal, so the operator sees the tool's own output.

use crate::error::ToolError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One invocation of an external executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Human readable tool name for errors and logs
    pub tool: &'static str,
    /// Executable
    pub program: PathBuf,
    /// Arguments in order
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    /// Create an invocation with no arguments
    pub fn new(tool: &'static str, program: &Path) -> Self {
        Self {
            tool,
            program: program.to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments as lossy strings, for diagnostics
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Error for an unsuccessful exit of this invocation
    pub fn failed(&self, exit_code: Option<i32>) -> ToolError {
        ToolError::Failed {
            tool: self.tool.to_string(),
            program: self.program.clone(),
            args: self.display_args(),
            exit_code,
        }
    }
}

/// Runs external tools to completion
pub trait ToolRunner {
    /// Run the invocation and wait for it to exit.
    ///
    /// Returns `Ok(())` only for a zero exit status.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;
}

/// [`ToolRunner`] backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        log::debug!(
            "Running {}: {} {}",
            invocation.tool,
            invocation.program.display(),
            invocation.display_args().join(" ")
        );

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| ToolError::Spawn {
                tool: invocation.tool.to_string(),
                program: invocation.program.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(invocation.failed(status.code()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = ToolInvocation::new("exporter", Path::new("godot"))
            .arg("--headless")
            .arg(Path::new("/tmp/out.exe"));
        assert_eq!(invocation.display_args(), vec!["--headless", "/tmp/out.exe"]);
    }

    #[test]
    fn test_spawn_failure_is_typed() {
        let invocation = ToolInvocation::new("exporter", Path::new("/nonexistent/godot-binary"));
        let result = ProcessRunner.run(&invocation);
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        let invocation = ToolInvocation::new("shell", Path::new("sh"))
            .arg("-c")
            .arg("exit 7");
        match ProcessRunner.run(&invocation) {
            Err(ToolError::Failed { exit_code, .. }) => assert_eq!(exit_code, Some(7)),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_success() {
        let invocation = ToolInvocation::new("shell", Path::new("true"));
        assert!(ProcessRunner.run(&invocation).is_ok());
    }
}
