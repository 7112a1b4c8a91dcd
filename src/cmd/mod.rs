use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmdError {
    #[error("command failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Runs external programs. Mocked in tests so nothing touches real processes.
#[cfg_attr(test, mockall::automock)]
pub trait CmdExec: Send + Sync {
    /// Run to completion and fail on a non-zero exit status.
    fn run(&self, name: &str, args: &[String]) -> Result<(), CmdError>;
    /// Start a detached process without waiting for it.
    fn spawn(&self, program: &Path, args: &[String]) -> Result<(), CmdError>;
}

pub struct SystemCmdExec;

impl CmdExec for SystemCmdExec {
    fn run(&self, name: &str, args: &[String]) -> Result<(), CmdError> {
        let output = Command::new(name).args(args).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CmdError::Failed(format!(
                "{} {} exited with {}",
                name,
                args.join(" "),
                output.status
            )))
        }
    }

    fn spawn(&self, program: &Path, args: &[String]) -> Result<(), CmdError> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// Helper to create args slice from string literals.
pub fn args(strs: &[&str]) -> Vec<String> {
    strs.iter().map(|s| s.to_string()).collect()
}
