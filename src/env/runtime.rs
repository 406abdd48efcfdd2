//! Python interpreter resolution

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{RunnerConfig, PYTHON_OVERRIDE_VAR};
use crate::error::{Result, RunnerError};

/// Where a resolved interpreter came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeSource {
    /// `COSCI_PYTHON`
    Override,
    /// Interpreter of the already-activated virtual environment (`VIRTUAL_ENV`)
    ActiveEnvironment,
    /// Found by name on `PATH`
    SearchPath,
}

impl fmt::Display for RuntimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeSource::Override => write!(f, "{}", PYTHON_OVERRIDE_VAR),
            RuntimeSource::ActiveEnvironment => write!(f, "VIRTUAL_ENV"),
            RuntimeSource::SearchPath => write!(f, "PATH"),
        }
    }
}

/// An existing, executable Python interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLocation {
    path: PathBuf,
    source: RuntimeSource,
}

impl RuntimeLocation {
    fn found(path: PathBuf, source: RuntimeSource) -> Self {
        info!("using python from {}: {}", source, path.display());
        Self { path, source }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> RuntimeSource {
        self.source
    }
}

/// Pick the interpreter used to create the managed environment.
///
/// Order: `COSCI_PYTHON`, then the interpreter of an active virtual
/// environment, then the default names on `PATH`. An override that does not
/// point at an executable is an error, never a fallthrough.
pub fn resolve_runtime(config: &RunnerConfig) -> Result<RuntimeLocation> {
    if let Some(raw) = config.python_override() {
        let path = resolve_override(config, raw)?;
        return Ok(RuntimeLocation::found(path, RuntimeSource::Override));
    }

    if let Some(active) = config.env.get("VIRTUAL_ENV") {
        let path = interpreter_in(Path::new(active));
        if is_executable(&path) {
            return Ok(RuntimeLocation::found(path, RuntimeSource::ActiveEnvironment));
        }
        debug!("VIRTUAL_ENV={} has no usable interpreter, ignoring", active);
    }

    for name in &config.default_interpreters {
        match which::which_in(name, config.search_path(), &config.project_root) {
            Ok(path) => return Ok(RuntimeLocation::found(path, RuntimeSource::SearchPath)),
            Err(e) => debug!("{} not found on PATH: {}", name, e),
        }
    }

    Err(not_on_path(&config.default_interpreters))
}

fn resolve_override(config: &RunnerConfig, raw: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(raw);

    // A bare name ("python3.12") is looked up on PATH, anything else is a path
    if candidate.components().count() == 1 && !candidate.is_absolute() {
        if let Ok(path) = which::which_in(raw, config.search_path(), &config.project_root) {
            return Ok(path);
        }
    }

    let path = if candidate.is_absolute() {
        candidate
    } else {
        config.project_root.join(candidate)
    };

    if !path.exists() {
        return Err(bad_override(raw, "no such file"));
    }
    if !is_executable(&path) {
        return Err(bad_override(raw, "not an executable file"));
    }
    Ok(path)
}

fn bad_override(raw: &str, reason: &str) -> RunnerError {
    RunnerError::RuntimeNotFound(format!(
        "{}={} is unusable ({})",
        PYTHON_OVERRIDE_VAR, raw, reason
    ))
}

fn not_on_path(names: &[String]) -> RunnerError {
    RunnerError::RuntimeNotFound(format!(
        "none of [{}] found on PATH; install Python 3 or set {}",
        names.join(", "),
        PYTHON_OVERRIDE_VAR
    ))
}

/// Interpreter inside a virtual environment directory.
///
/// Prefers whichever layout exists; falls back to the platform's layout.
pub fn interpreter_in(env_dir: &Path) -> PathBuf {
    let unix = env_dir.join("bin").join("python");
    let windows = env_dir.join("Scripts").join("python.exe");
    if unix.exists() {
        unix
    } else if windows.exists() {
        windows
    } else if cfg!(windows) {
        windows
    } else {
        unix
    }
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
