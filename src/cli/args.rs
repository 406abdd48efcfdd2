//! Command-line parsing
//!
//! Only the first argument is interpreted. Everything after an `interactive`
//! or `batch` subcommand belongs to the application and is forwarded as is,
//! including flags such as `--help` and a literal `--`.

use std::ffi::OsString;

/// Usage text printed for `help` and for unknown commands
pub const USAGE: &str = "\
Usage: cosci <command> [args...]

Commands:
  setup                Create .venv and install requirements.txt
  interactive, repl    Run the co-scientist in interactive mode
  batch, run           Run the co-scientist non-interactively
  help, -h, --help     Show this help message

Arguments after interactive/batch are passed to the application unchanged:
  --goal <text>              Research goal (natural language)
  --input-json <path>        JSON file with the initial state
  --literature-file <path>   Text file with literature content
  --max-iterations <n>       Supervisor iterations before termination
  --model <name>             Chat model name
  --temperature <t>          Sampling temperature

Examples:
  cosci setup
  cosci batch --goal \"Explain protein misfolding in ALS\" --max-iterations 5
  cosci repl --goal \"Novel antibiotics\"

Environment:
  COSCI_PYTHON         Interpreter used to create .venv (default: python3 on PATH)
  COSCI_PROJECT_ROOT   Project directory (default: current directory)
  COSCI_LOG            Log filter, e.g. info or debug (default: warn)
";

/// How the application entrypoint is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Interactive,
    Batch,
}

/// A parsed invocation of the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    /// No arguments, `help`, `-h` or `--help`
    Help,
    /// Create the environment and install dependencies
    Setup,
    /// Launch the application, forwarding `args` untouched
    Launch { mode: LaunchMode, args: Vec<OsString> },
    /// Anything else; holds the offending token
    Unknown(String),
}

impl DispatchRequest {
    /// Parse arguments without the program name.
    ///
    /// Matching is exact and case-sensitive. Arguments need not be valid
    /// UTF-8; a non-UTF-8 subcommand is simply unknown.
    pub fn parse(args: &[OsString]) -> Self {
        let Some((command, rest)) = args.split_first() else {
            return DispatchRequest::Help;
        };

        let Some(command) = command.to_str() else {
            return DispatchRequest::Unknown(command.to_string_lossy().into_owned());
        };

        match command {
            "help" | "-h" | "--help" => DispatchRequest::Help,
            "setup" => DispatchRequest::Setup,
            "interactive" | "repl" => DispatchRequest::Launch {
                mode: LaunchMode::Interactive,
                args: rest.to_vec(),
            },
            "batch" | "run" => DispatchRequest::Launch {
                mode: LaunchMode::Batch,
                args: rest.to_vec(),
            },
            other => DispatchRequest::Unknown(other.to_string()),
        }
    }
}
