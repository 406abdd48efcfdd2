//! Managed virtual environment
//!
//! The environment lives at a fixed path under the project root. It is
//! created once and then only ever mutated by `pip`; the runner never deletes
//! or repairs it. A half-created `.venv` has to be removed by hand.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::runtime::{interpreter_in, RuntimeLocation};
use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::process::{run_child, ChildInvocation, InterruptFlag, Launcher};

/// Outcome of [`EnvironmentManager::ensure_environment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentState {
    Created,
    AlreadyPresent,
}

pub struct EnvironmentManager<'a, L: Launcher + ?Sized> {
    config: &'a RunnerConfig,
    launcher: &'a L,
    interrupt: &'a InterruptFlag,
}

impl<'a, L: Launcher + ?Sized> EnvironmentManager<'a, L> {
    pub fn new(config: &'a RunnerConfig, launcher: &'a L, interrupt: &'a InterruptFlag) -> Self {
        Self {
            config,
            launcher,
            interrupt,
        }
    }

    pub fn env_dir(&self) -> PathBuf {
        self.config.env_dir()
    }

    /// Interpreter inside the managed environment
    pub fn python(&self) -> PathBuf {
        interpreter_in(&self.env_dir())
    }

    /// Create the environment with `<runtime> -m venv` unless the directory exists.
    ///
    /// Existence of the directory is the only check; its contents are not validated.
    pub fn ensure_environment(&self, runtime: &RuntimeLocation) -> Result<EnvironmentState> {
        let env_dir = self.env_dir();
        if env_dir.exists() {
            info!("virtual environment present at {}", env_dir.display());
            return Ok(EnvironmentState::AlreadyPresent);
        }

        eprintln!("Creating virtual environment in {}", env_dir.display());
        let invocation = ChildInvocation::new(runtime.path(), &self.config.project_root)
            .args(["-m", "venv"])
            .path_arg(&env_dir);

        let exit = run_child(self.launcher, self.interrupt, &invocation).map_err(|e| match e {
            RunnerError::IoError(io) => creation_failed(&env_dir, io.to_string()),
            other => other,
        })?;
        if !exit.success() {
            if env_dir.exists() {
                warn!(
                    "{} was left behind; delete it before retrying",
                    env_dir.display()
                );
            }
            return Err(creation_failed(&env_dir, format!("venv {}", exit)));
        }

        Ok(EnvironmentState::Created)
    }

    /// Upgrade pip's toolchain, then install the manifest. Both steps must succeed.
    pub fn install_dependencies(&self) -> Result<()> {
        let manifest = self.config.manifest_path();
        if !manifest.is_file() {
            return Err(RunnerError::DependencyInstallFailed {
                step: "manifest".to_string(),
                reason: format!("{} not found", manifest.display()),
            });
        }

        println!("Upgrading pip...");
        self.pip_step(
            "pip upgrade",
            ["install", "--upgrade", "pip", "setuptools", "wheel"],
        )?;

        println!("Installing dependencies from {}...", self.config.manifest_name);
        self.pip_step(
            "requirements install",
            [
                OsString::from("install"),
                OsString::from("-r"),
                manifest.into_os_string(),
            ],
        )?;

        Ok(())
    }

    /// Variables that make a child behave as if the environment were activated
    pub fn activation_overlay(&self) -> Vec<(String, String)> {
        let env_dir = self.env_dir();
        let mut overlay = vec![(
            "VIRTUAL_ENV".to_string(),
            env_dir.to_string_lossy().into_owned(),
        )];

        let python = self.python();
        if let Some(bin) = python.parent() {
            if let Some(path) = prepend_search_path(bin, self.config.env.get("PATH")) {
                overlay.push(("PATH".to_string(), path));
            }
        }
        overlay
    }

    fn pip_step<I, S>(&self, step: &str, pip_args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let invocation = ChildInvocation::new(self.python(), &self.config.project_root)
            .args(["-m", "pip"])
            .args(pip_args);

        let exit = run_child(self.launcher, self.interrupt, &invocation).map_err(|e| match e {
            RunnerError::IoError(io) => install_failed(step, io.to_string()),
            other => other,
        })?;
        if !exit.success() {
            return Err(install_failed(step, format!("pip {}", exit)));
        }
        Ok(())
    }
}

fn creation_failed(path: &Path, reason: String) -> RunnerError {
    RunnerError::EnvironmentCreationFailed {
        path: path.to_path_buf(),
        reason,
    }
}

fn install_failed(step: &str, reason: String) -> RunnerError {
    RunnerError::DependencyInstallFailed {
        step: step.to_string(),
        reason,
    }
}

fn prepend_search_path(dir: &Path, current: Option<&str>) -> Option<String> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(current) = current {
        entries.extend(std::env::split_paths(current));
    }
    std::env::join_paths(entries).ok()?.into_string().ok()
}
