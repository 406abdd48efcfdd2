//! End-to-end tests driving the cosci binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn cosci(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cosci").unwrap();
    cmd.current_dir(root)
        .env("COSCI_PROJECT_ROOT", root)
        .env_remove("COSCI_PYTHON")
        .env_remove("COSCI_LOG")
        .env_remove("VIRTUAL_ENV");
    cmd
}

#[test]
fn test_no_arguments_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    cosci(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: cosci"));
    assert!(!dir.path().join(".venv").exists());
}

#[test]
fn test_help_aliases() {
    let dir = tempfile::tempdir().unwrap();
    for alias in ["help", "-h", "--help"] {
        cosci(dir.path())
            .arg(alias)
            .assert()
            .code(0)
            .stdout(predicate::str::contains("interactive, repl"));
    }
    assert!(!dir.path().join(".venv").exists());
}

#[test]
fn test_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    cosci(dir.path())
        .args(["frobnicate", "--goal", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown command: frobnicate"))
        .stderr(predicate::str::contains("Usage: cosci"));
}

#[test]
fn test_missing_interpreter_override() {
    let dir = tempfile::tempdir().unwrap();
    for command in ["setup", "batch", "interactive"] {
        cosci(dir.path())
            .arg(command)
            .env("COSCI_PYTHON", dir.path().join("no-such-python"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("COSCI_PYTHON"));
    }
    assert!(!dir.path().join(".venv").exists());
}

#[cfg(unix)]
mod fake_python {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in interpreter: logs each argv as `<arg><arg>...`, fakes
    /// `-m venv` by copying itself into the new environment, and exits
    /// according to COSCI_FAKE_* variables.
    const SCRIPT: &str = r#"#!/bin/sh
for a in "$@"; do printf '<%s>' "$a"; done >> "$COSCI_FAKE_LOG"
echo >> "$COSCI_FAKE_LOG"
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    mkdir -p "$3/bin" && cp "$0" "$3/bin/python" && chmod +x "$3/bin/python"
    exit $?
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    exit "${COSCI_FAKE_PIP_EXIT:-0}"
fi
if [ "$COSCI_FAKE_MODE" = "sigint" ]; then
    kill -INT $$
fi
exit "${COSCI_FAKE_EXIT:-0}"
"#;

    struct Project {
        dir: tempfile::TempDir,
    }

    impl Project {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let python = dir.path().join("fake-python");
            std::fs::write(&python, SCRIPT).unwrap();
            std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();
            std::fs::write(dir.path().join("requirements.txt"), "langgraph\n").unwrap();
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn log(&self) -> PathBuf {
            self.root().join("invocations.log")
        }

        fn logged(&self) -> Vec<String> {
            std::fs::read_to_string(self.log())
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }

        fn cosci(&self) -> Command {
            let mut cmd = cosci(self.root());
            cmd.env("COSCI_PYTHON", self.root().join("fake-python"))
                .env("COSCI_FAKE_LOG", self.log());
            cmd
        }

        /// Populated environment without going through setup
        fn with_environment(self) -> Self {
            let bin = self.root().join(".venv").join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            std::fs::copy(self.root().join("fake-python"), bin.join("python")).unwrap();
            std::fs::set_permissions(bin.join("python"), std::fs::Permissions::from_mode(0o755))
                .unwrap();
            self
        }
    }

    #[test]
    fn test_setup_from_scratch() {
        let project = Project::new();
        project.cosci().arg("setup").assert().success();

        let root = project.root().display().to_string();
        assert_eq!(
            project.logged(),
            vec![
                format!("<-m><venv><{}/.venv>", root),
                "<-m><pip><install><--upgrade><pip><setuptools><wheel>".to_string(),
                format!("<-m><pip><install><-r><{}/requirements.txt>", root),
            ]
        );
        assert!(project.root().join(".venv/bin/python").exists());
    }

    #[test]
    fn test_setup_failed_install() {
        let project = Project::new();
        project
            .cosci()
            .arg("setup")
            .env("COSCI_FAKE_PIP_EXIT", "2")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("pip upgrade"));
        assert_eq!(project.logged().len(), 2);
    }

    #[test]
    fn test_batch_on_existing_environment() {
        let project = Project::new().with_environment();
        project
            .cosci()
            .args(["batch", "--goal", "test"])
            .assert()
            .success();

        assert_eq!(
            project.logged(),
            vec!["<-m><co_scientist_langgraph.cli><--goal><test>".to_string()]
        );
    }

    #[test]
    fn test_passthrough_preserves_arguments() {
        let project = Project::new().with_environment();
        project
            .cosci()
            .args(["run", "--goal", "x y", "--max-iterations", "3", "--", "--help"])
            .assert()
            .success();

        assert_eq!(
            project.logged(),
            vec!["<-m><co_scientist_langgraph.cli><--goal><x y><--max-iterations><3><--><--help>"
                .to_string()]
        );
    }

    #[test]
    fn test_non_utf8_argument_is_forwarded_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let project = Project::new().with_environment();
        project
            .cosci()
            .arg("batch")
            .arg("--literature-file")
            .arg(OsStr::from_bytes(b"lit\xff.txt"))
            .assert()
            .success();

        let logged = std::fs::read(project.log()).unwrap();
        assert_eq!(
            logged,
            b"<-m><co_scientist_langgraph.cli><--literature-file><lit\xff.txt>\n".to_vec()
        );
    }

    #[test]
    fn test_interactive_flag_is_prefixed() {
        let project = Project::new().with_environment();
        project
            .cosci()
            .args(["repl", "--goal", "g"])
            .assert()
            .success();

        assert_eq!(
            project.logged(),
            vec!["<-m><co_scientist_langgraph.cli><--interactive><--goal><g>".to_string()]
        );
    }

    #[test]
    fn test_launch_creates_environment_but_does_not_install() {
        let project = Project::new();
        // Progress lines go to stderr; stdout belongs to the application
        project
            .cosci()
            .arg("batch")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let logged = project.logged();
        assert_eq!(logged.len(), 2);
        assert!(logged[0].starts_with("<-m><venv>"));
        assert_eq!(logged[1], "<-m><co_scientist_langgraph.cli>");
    }

    #[test]
    fn test_child_exit_code_is_propagated() {
        let project = Project::new().with_environment();
        project
            .cosci()
            .args(["batch", "--goal", "test"])
            .env("COSCI_FAKE_EXIT", "3")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("exited with code 3"));
    }

    #[test]
    fn test_interrupted_child_exits_130() {
        let project = Project::new();
        project
            .cosci()
            .args(["batch", "--goal", "test"])
            .env("COSCI_FAKE_MODE", "sigint")
            .assert()
            .code(130)
            .stderr(predicate::str::contains("Interrupted"));

        // venv creation then the entrypoint; nothing after the interrupt
        assert_eq!(project.logged().len(), 2);
    }

    #[test]
    fn test_application_sees_activated_environment() {
        let project = Project::new().with_environment();
        let script = project.root().join(".venv/bin/python");
        std::fs::write(
            &script,
            "#!/bin/sh\n[ \"$VIRTUAL_ENV\" = \"$COSCI_EXPECT_VENV\" ] && [ \"$OPENAI_API_KEY\" = sk-test ]\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        project
            .cosci()
            .arg("batch")
            .env("OPENAI_API_KEY", "sk-test")
            .env("COSCI_EXPECT_VENV", project.root().join(".venv"))
            .assert()
            .success();
    }
}
