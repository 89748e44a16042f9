//! Source formatting for generated files.
//!
//! The [`SourceFormatter`] trait is the seam between the writer and whatever
//! normalises the rendered source. The production implementation is
//! [`CommandFormatter`], which pipes the source through an external tool
//! (`gofmt` by default) over stdin/stdout.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter `{command}` could not be started: {source}")]
    Unavailable {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("formatter rejected the source: {stderr}")]
    Rejected { stderr: String },
    #[error("formatter IO error: {0}")]
    Io(#[from] io::Error),
}

pub trait SourceFormatter {
    /// Return the formatted form of `source`.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

impl<T: SourceFormatter + ?Sized> SourceFormatter for std::sync::Arc<T> {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        (**self).format(source)
    }
}

/// Runs an external formatter that reads source on stdin and prints the
/// formatted source on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    command: String,
    args: Vec<String>,
}

impl Default for CommandFormatter {
    fn default() -> Self {
        Self::new("gofmt", Vec::<String>::new())
    }
}

impl CommandFormatter {
    pub fn new(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Unavailable {
                command: self.command.clone(),
                source,
            })?;

        // Dropping stdin closes the pipe. A broken pipe means the tool exited
        // early, and its exit status is checked below.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(source.as_bytes()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(FormatError::Rejected {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout)
            .map_err(|e| FormatError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
