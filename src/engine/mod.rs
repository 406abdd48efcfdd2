//! Dispatch engine for cosci requests

pub mod dispatcher;

pub use dispatcher::Dispatcher;
