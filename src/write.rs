//! Writing rendered output to disk.
//!
//! Files are overwritten unconditionally. When a formatter is supplied the
//! file is written first, read back, formatted, and written again, so a
//! formatter failure still leaves the unformatted output on disk for
//! inspection.

use crate::format::{FormatError, SourceFormatter};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read back {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to format {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
        /// The rendered text the formatter refused.
        content: String,
    },
}

/// Write `contents` to `path`, creating parent directories, then optionally
/// format the file in place.
pub fn write_output(
    path: &Path,
    contents: &str,
    formatter: Option<&dyn SourceFormatter>,
) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_file(path, contents)?;

    let Some(formatter) = formatter else {
        return Ok(());
    };

    let written = std::fs::read_to_string(path).map_err(|source| WriteError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let formatted = formatter
        .format(&written)
        .map_err(|source| WriteError::Format {
            path: path.to_path_buf(),
            source,
            content: written.clone(),
        })?;
    if formatted != written {
        write_file(path, &formatted)?;
    }
    tracing::debug!(path = %path.display(), "formatted");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), WriteError> {
    std::fs::write(path, contents).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}
