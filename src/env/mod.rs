//! Environment manager: interpreter lookup and the managed virtual environment

pub mod manager;
pub mod runtime;

pub use manager::{EnvironmentManager, EnvironmentState};
pub use runtime::{resolve_runtime, RuntimeLocation, RuntimeSource};
