//! Commands run once after a generation or init finishes.

use std::io;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("post-generate hook `{command}` could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("post-generate hook `{command}` failed ({status}): {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

pub trait PostGenerateHook {
    fn run(&self, project_dir: &Path) -> Result<(), HookError>;

    /// Human-readable description for reports.
    fn describe(&self) -> String;
}

impl<T: PostGenerateHook + ?Sized> PostGenerateHook for std::sync::Arc<T> {
    fn run(&self, project_dir: &Path) -> Result<(), HookError> {
        (**self).run(project_dir)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Runs a program with arguments inside the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
}

impl CommandHook {
    /// `None` for an empty command line, which disables the hook.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn go_mod_tidy() -> Self {
        Self {
            program: "go".into(),
            args: vec!["mod".into(), "tidy".into()],
        }
    }
}

impl PostGenerateHook for CommandHook {
    fn run(&self, project_dir: &Path) -> Result<(), HookError> {
        tracing::info!(command = %self.describe(), dir = %project_dir.display(), "running hook");
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_dir)
            .output()
            .map_err(|source| HookError::Spawn {
                command: self.describe(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(HookError::Failed {
            command: self.describe(),
            status: output.status.to_string(),
            output: combined.trim().to_string(),
        })
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Hook that records the directories it was run in.
    #[derive(Default)]
    pub struct RecordingHook {
        pub runs: Mutex<Vec<PathBuf>>,
        pub fail: bool,
    }

    impl RecordingHook {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                runs: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn get_runs(&self) -> Vec<PathBuf> {
            self.runs.lock().unwrap().clone()
        }
    }

    impl PostGenerateHook for RecordingHook {
        fn run(&self, project_dir: &Path) -> Result<(), HookError> {
            self.runs.lock().unwrap().push(project_dir.to_path_buf());
            if self.fail {
                return Err(HookError::Failed {
                    command: self.describe(),
                    status: "exit status: 1".into(),
                    output: "go: updates to go.mod needed".into(),
                });
            }
            Ok(())
        }

        fn describe(&self) -> String {
            "recording hook".into()
        }
    }

    #[test]
    fn empty_argv_disables_hook() {
        assert_eq!(CommandHook::from_argv(&[]), None);
    }

    #[test]
    fn describe_joins_argv() {
        assert_eq!(CommandHook::go_mod_tidy().describe(), "go mod tidy");
        let argv = vec!["make".to_string(), "generate".to_string()];
        assert_eq!(CommandHook::from_argv(&argv).unwrap().describe(), "make generate");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let hook = CommandHook::from_argv(&["alchemy-no-such-hook".to_string()]).unwrap();
        assert!(matches!(
            hook.run(tmp.path()),
            Err(HookError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_project_dir_and_reports_failure_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ok = CommandHook::from_argv(&["sh".into(), "-c".into(), "touch ran".into()]).unwrap();
        ok.run(tmp.path()).unwrap();
        assert!(tmp.path().join("ran").exists());

        let bad = CommandHook::from_argv(&["sh".into(), "-c".into(), "echo nope >&2; exit 3".into()])
            .unwrap();
        match bad.run(tmp.path()).unwrap_err() {
            HookError::Failed { output, .. } => assert_eq!(output, "nope"),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
