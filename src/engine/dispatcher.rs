//! Request dispatcher
//!
//! Drives a [`DispatchRequest`] to one of its terminal outcomes. Every step is
//! an explicit call whose error is returned immediately; nothing is retried.

use std::ffi::OsString;

use tracing::info;

use crate::cli::{DispatchRequest, LaunchMode, USAGE};
use crate::config::RunnerConfig;
use crate::env::{resolve_runtime, EnvironmentManager};
use crate::error::{Result, RunnerError};
use crate::process::{run_child, ChildExit, ChildInvocation, InterruptFlag, Launcher};

pub struct Dispatcher<'a, L: Launcher + ?Sized> {
    config: &'a RunnerConfig,
    launcher: &'a L,
    interrupt: &'a InterruptFlag,
}

impl<'a, L: Launcher + ?Sized> Dispatcher<'a, L> {
    pub fn new(config: &'a RunnerConfig, launcher: &'a L, interrupt: &'a InterruptFlag) -> Self {
        Self {
            config,
            launcher,
            interrupt,
        }
    }

    fn manager(&self) -> EnvironmentManager<'a, L> {
        EnvironmentManager::new(self.config, self.launcher, self.interrupt)
    }

    /// Run `request` and return the exit code for a successful outcome
    pub fn dispatch(&self, request: &DispatchRequest) -> Result<i32> {
        match request {
            DispatchRequest::Help => {
                print!("{}", USAGE);
                Ok(0)
            }
            DispatchRequest::Setup => {
                self.setup()?;
                Ok(0)
            }
            DispatchRequest::Launch { mode, args } => self.launch(*mode, args),
            DispatchRequest::Unknown(token) => Err(RunnerError::UnknownCommand(token.clone())),
        }
    }

    /// Resolve the runtime, create the environment if needed, install dependencies
    pub fn setup(&self) -> Result<()> {
        let runtime = resolve_runtime(self.config)?;
        let manager = self.manager();
        manager.ensure_environment(&runtime)?;
        manager.install_dependencies()?;
        println!("Setup complete. Environment ready at {}", manager.env_dir().display());
        Ok(())
    }

    /// Start the application in the managed environment and wait for it.
    ///
    /// Dependencies are not installed here; only `setup` does that.
    pub fn launch(&self, mode: LaunchMode, args: &[OsString]) -> Result<i32> {
        let runtime = resolve_runtime(self.config)?;
        self.manager().ensure_environment(&runtime)?;

        let invocation = self.entrypoint_invocation(mode, args);
        info!("launching {} in {:?} mode", self.config.entry_module, mode);

        match run_child(self.launcher, self.interrupt, &invocation)? {
            ChildExit::Exited(0) => Ok(0),
            exit => Err(RunnerError::ChildProcessFailed { code: exit.code() }),
        }
    }

    /// `<env python> -m <entry module> [--interactive] <args...>` run from the project root
    pub fn entrypoint_invocation(&self, mode: LaunchMode, args: &[OsString]) -> ChildInvocation {
        let manager = self.manager();
        let mut invocation = ChildInvocation::new(manager.python(), &self.config.project_root)
            .args(["-m", self.config.entry_module.as_str()]);
        if mode == LaunchMode::Interactive {
            invocation = invocation.arg(self.config.interactive_flag.as_str());
        }
        invocation
            .args(args.iter().cloned())
            .envs(manager.activation_overlay())
    }
}
