//! Runner configuration
//!
//! All process-wide state the runner depends on (interpreter override,
//! project root, search path) is captured once into [`EnvVars`] and handed
//! to [`RunnerConfig`], so nothing below `main` reads the live environment.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Variable naming an explicit Python interpreter
pub const PYTHON_OVERRIDE_VAR: &str = "COSCI_PYTHON";

/// Variable overriding the project root (defaults to the current directory)
pub const PROJECT_ROOT_VAR: &str = "COSCI_PROJECT_ROOT";

/// Variable holding the log filter
pub const LOG_VAR: &str = "COSCI_LOG";

/// Default log filter when `COSCI_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable; empty values count as unset
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Everything the environment manager and dispatcher need to know about the project
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory holding the manifest and the managed environment
    pub project_root: PathBuf,
    /// Name of the managed environment directory under the project root
    pub env_dir_name: String,
    /// Name of the dependency manifest under the project root
    pub manifest_name: String,
    /// Python module launched for `interactive` and `batch`
    pub entry_module: String,
    /// Flag prefixed to the passthrough arguments in interactive mode
    pub interactive_flag: String,
    /// Interpreter names tried on the search path, in order
    pub default_interpreters: Vec<String>,
    /// Environment snapshot used for resolution and inherited by children
    pub env: EnvVars,
}

impl RunnerConfig {
    /// Configuration rooted at `project_root` with the standard layout
    pub fn new(project_root: impl Into<PathBuf>, env: EnvVars) -> Self {
        Self {
            project_root: project_root.into(),
            env_dir_name: ".venv".to_string(),
            manifest_name: "requirements.txt".to_string(),
            entry_module: "co_scientist_langgraph.cli".to_string(),
            interactive_flag: "--interactive".to_string(),
            default_interpreters: vec!["python3".to_string(), "python".to_string()],
            env,
        }
    }

    /// Resolve the project root from `COSCI_PROJECT_ROOT`, falling back to `cwd`
    pub fn from_env(env: EnvVars, cwd: &Path) -> Self {
        let root = env
            .get(PROJECT_ROOT_VAR)
            .map(|r| {
                let r = PathBuf::from(r);
                if r.is_absolute() {
                    r
                } else {
                    cwd.join(r)
                }
            })
            .unwrap_or_else(|| cwd.to_path_buf());
        Self::new(root, env)
    }

    pub fn env_dir(&self) -> PathBuf {
        self.project_root.join(&self.env_dir_name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(&self.manifest_name)
    }

    /// Value of the interpreter override, if one is set
    pub fn python_override(&self) -> Option<&str> {
        self.env.get(PYTHON_OVERRIDE_VAR)
    }

    /// Search path used for default interpreter lookup
    pub fn search_path(&self) -> Option<OsString> {
        self.env.get("PATH").map(OsString::from)
    }
}
