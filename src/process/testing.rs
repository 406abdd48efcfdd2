//! Fake launcher for unit tests

use std::cell::RefCell;
use std::path::Path;

use super::{ChildExit, ChildInvocation, Launcher};
use crate::error::Result;

type ExitFn = Box<dyn Fn(&ChildInvocation) -> ChildExit>;

/// Records every invocation instead of running it.
///
/// `-m venv <dir>` creates `<dir>` so existence checks behave like the real thing.
pub(crate) struct RecordingLauncher {
    calls: RefCell<Vec<ChildInvocation>>,
    exit: ExitFn,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            exit: Box::new(|_| ChildExit::Exited(0)),
        }
    }

    pub fn with_exit(mut self, exit: impl Fn(&ChildInvocation) -> ChildExit + 'static) -> Self {
        self.exit = Box::new(exit);
        self
    }

    pub fn calls(&self) -> Vec<ChildInvocation> {
        self.calls.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, invocation: &ChildInvocation) -> Result<ChildExit> {
        self.calls.borrow_mut().push(invocation.clone());
        let exit = (self.exit)(invocation);
        if exit.success() && invocation.args.len() == 3 && invocation.args[..2] == ["-m", "venv"] {
            std::fs::create_dir_all(Path::new(&invocation.args[2]))?;
        }
        Ok(exit)
    }
}
