//! cosci CLI - prepare the co-scientist environment and run the application

use std::ffi::OsString;
use std::process::exit;

use cosci::config::{EnvVars, RunnerConfig, DEFAULT_LOG_FILTER, LOG_VAR};
use cosci::{DispatchRequest, Dispatcher, InterruptFlag, RunnerError, SystemLauncher, USAGE};

fn main() {
    let env = EnvVars::from_process();

    let log_level = env.get(LOG_VAR).unwrap_or(DEFAULT_LOG_FILTER).to_string();
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let code = match run(env) {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    };
    exit(code);
}

fn run(env: EnvVars) -> cosci::Result<i32> {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let request = DispatchRequest::parse(&args);
    let interrupt = InterruptFlag::new();
    if matches!(request, DispatchRequest::Setup | DispatchRequest::Launch { .. }) {
        interrupt.install()?;
    }

    let cwd = std::env::current_dir()?;
    let config = RunnerConfig::from_env(env, &cwd);
    Dispatcher::new(&config, &SystemLauncher, &interrupt).dispatch(&request)
}

fn report(error: &RunnerError) {
    eprintln!("Error: {}", error);
    if let RunnerError::UnknownCommand(_) = error {
        eprintln!();
        eprint!("{}", USAGE);
    }
}
