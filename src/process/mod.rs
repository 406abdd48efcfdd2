//! Child process invocation
//!
//! Every child the runner starts (venv creation, pip, the application
//! entrypoint) is described by a [`ChildInvocation`] and executed through a
//! [`Launcher`]. Launches are blocking and always inherit stdin, stdout and
//! stderr from the runner.

pub mod interrupt;
#[cfg(test)]
pub(crate) mod testing;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{Result, RunnerError, INTERRUPTED_EXIT_CODE};

pub use interrupt::InterruptFlag;

/// A command line to run, where to run it, and extra environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInvocation {
    pub program: PathBuf,
    /// Arguments are kept as OS strings so they reach the child byte for byte
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Variables set on top of the inherited environment, in order
    pub env: Vec<(String, String)>,
}

impl ChildInvocation {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }
}

impl fmt::Display for ChildInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How a child process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by SIGINT
    Interrupted,
    /// Killed by another signal
    Signaled(i32),
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ChildExit::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                if signal == libc::SIGINT {
                    return ChildExit::Interrupted;
                }
                return ChildExit::Signaled(signal);
            }
        }
        ChildExit::Exited(1)
    }

    pub fn success(&self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }

    /// Exit code following the shell convention for signals
    pub fn code(&self) -> i32 {
        match self {
            ChildExit::Exited(code) => *code,
            ChildExit::Interrupted => INTERRUPTED_EXIT_CODE,
            ChildExit::Signaled(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exit code {}", code),
            ChildExit::Interrupted => write!(f, "interrupted"),
            ChildExit::Signaled(signal) => write!(f, "killed by signal {}", signal),
        }
    }
}

/// Runs child invocations to completion
pub trait Launcher {
    /// Run `invocation` and block until it terminates.
    ///
    /// Only a failure to start the process is an `Err`; a non-zero exit is
    /// reported through [`ChildExit`].
    fn launch(&self, invocation: &ChildInvocation) -> Result<ChildExit>;
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, invocation: &ChildInvocation) -> Result<ChildExit> {
        (**self).launch(invocation)
    }
}

/// Launches real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &ChildInvocation) -> Result<ChildExit> {
        debug!(cwd = %invocation.cwd.display(), "running {}", invocation);

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        let exit = ChildExit::from_status(status);
        debug!("{} finished: {}", invocation.program.display(), exit);
        Ok(exit)
    }
}

/// Launch one child with interrupt checks on both sides.
///
/// Nothing is started once an interrupt has been seen, and a child that was
/// killed by SIGINT (or finished while the runner was interrupted) turns into
/// [`RunnerError::Interrupted`].
pub fn run_child<L: Launcher + ?Sized>(
    launcher: &L,
    interrupt: &InterruptFlag,
    invocation: &ChildInvocation,
) -> Result<ChildExit> {
    interrupt.check()?;
    let exit = launcher.launch(invocation)?;
    if exit == ChildExit::Interrupted {
        return Err(RunnerError::Interrupted);
    }
    interrupt.check()?;
    Ok(exit)
}
