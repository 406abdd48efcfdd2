//! cosci - bootstrap-and-dispatch runner for the AI co-scientist
//!
//! cosci owns a Python virtual environment under the project root, installs
//! the project's `requirements.txt` into it, and launches the application
//! entrypoint inside it, relaying the application's exit code.
//!
//! # Example
//!
//! ```no_run
//! use cosci::{DispatchRequest, Dispatcher, EnvVars, InterruptFlag, RunnerConfig, SystemLauncher};
//!
//! let config = RunnerConfig::new("/srv/co-scientist", EnvVars::from_process());
//! let interrupt = InterruptFlag::new();
//! let dispatcher = Dispatcher::new(&config, &SystemLauncher, &interrupt);
//! let args: Vec<std::ffi::OsString> = std::env::args_os().skip(1).collect();
//! let request = DispatchRequest::parse(&args);
//! let code = dispatcher.dispatch(&request).unwrap_or_else(|e| e.exit_code());
//! std::process::exit(code);
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod process;

pub use cli::{DispatchRequest, LaunchMode, USAGE};
pub use config::{EnvVars, RunnerConfig};
pub use engine::Dispatcher;
pub use env::{resolve_runtime, EnvironmentManager, RuntimeLocation};
pub use error::{Result, RunnerError};
pub use process::{ChildExit, ChildInvocation, InterruptFlag, Launcher, SystemLauncher};
