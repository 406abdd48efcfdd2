//! Error types for cosci

use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when the run was interrupted (SIGINT / Ctrl+C)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit code for failures detected by the runner itself
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Python runtime not found: {0}")]
    RuntimeNotFound(String),

    #[error("Failed to create virtual environment at {}: {reason}", path.display())]
    EnvironmentCreationFailed { path: PathBuf, reason: String },

    #[error("Dependency installation failed during {step}: {reason}")]
    DependencyInstallFailed { step: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Application exited with code {code}")]
    ChildProcessFailed { code: i32 },

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RunnerError {
    /// Process exit code the runner terminates with for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::ChildProcessFailed { code } => *code,
            RunnerError::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => FAILURE_EXIT_CODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
