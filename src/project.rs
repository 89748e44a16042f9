//! Facts read from the target Go project.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("no go.mod in {0}")]
    MissingGoMod(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid module declaration on line {line} of {path}")]
    InvalidModuleDeclaration { path: PathBuf, line: usize },
    #[error("no module declaration found in {0}")]
    ModuleNotFound(PathBuf),
    #[error("cannot derive a project name from {0}")]
    NoDirectoryName(PathBuf),
}

/// The module path declared in `dir/go.mod`.
///
/// The first line starting with `module` wins; a quoted path is unquoted and
/// a trailing `//` comment is ignored.
pub fn module_name(dir: &Path) -> Result<String, ProjectError> {
    let path = dir.join("go.mod");
    let content = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ProjectError::MissingGoMod(dir.to_path_buf())
        } else {
            ProjectError::Read {
                path: path.clone(),
                source,
            }
        }
    })?;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        // `modulefoo` is not a declaration.
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let rest = rest.split("//").next().unwrap_or_default().trim();
        let name = rest.trim_matches('"');
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ProjectError::InvalidModuleDeclaration {
                path,
                line: index + 1,
            });
        }
        return Ok(name.to_string());
    }
    Err(ProjectError::ModuleNotFound(path))
}

/// Last component of the absolute form of `dir`, used as the project name.
pub fn directory_name(dir: &Path) -> Result<String, ProjectError> {
    let absolute = std::path::absolute(dir).map_err(|source| ProjectError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    // `absolute` keeps `..`, so normalise by canonicalising when possible.
    let resolved = absolute.canonicalize().unwrap_or(absolute);
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(ProjectError::NoDirectoryName(resolved))
}
