//! Running external programs.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use super::RealRuntime;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute {}", program.display()))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[test]
    fn test_command_output_success() {
        let ok = CommandOutput {
            code: Some(0),
            ..Default::default()
        };
        assert!(ok.success());

        let failed = CommandOutput {
            code: Some(2),
            ..Default::default()
        };
        assert!(!failed.success());

        let signalled = CommandOutput::default();
        assert!(!signalled.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_runtime_run_command() {
        let runtime = RealRuntime;

        let output = runtime
            .run_command(Path::new("/bin/sh"), &["-c".to_string(), "echo hi; exit 3".to_string()])
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "hi");
    }

    #[test]
    fn test_real_runtime_run_missing_program() {
        let runtime = RealRuntime;
        let err = runtime
            .run_command(Path::new("/nonexistent/bin/aurl"), &[])
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }
}
