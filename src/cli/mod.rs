//! CLI surface

pub mod args;

pub use args::{DispatchRequest, LaunchMode, USAGE};
