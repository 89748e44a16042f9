//! The project manifest (`alchemy.yaml`).
//!
//! Records which generated files belong to which component, so later
//! generations can merge into what is already there:
//!
//! ```yaml
//! ProjectName: shop
//! Root: .
//! Orm:
//!   Name: Prisma
//!   DatabaseProvider: PostgreSQL
//! Components:
//!   - Id: Authentication
//!     Path: .
//!     Models:
//!       - Id: UserDao
//!         Path: dao/user.go
//!     Services:
//!       - Id: Login
//!         Path: services/authentication.go
//! ```
//!
//! [`ManifestStore`] is the only writer. Every save rewrites the whole file;
//! there is no locking, so two concurrent runs race.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILENAME: &str = "alchemy.yaml";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("no {MANIFEST_FILENAME} found at {0}; run `alchemy init` first")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub project_name: String,
    pub root: String,
    pub orm: Orm,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Orm {
    pub name: String,
    pub database_provider: String,
}

/// Generated files owned by one component category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub models: Vec<Dependency>,
    #[serde(default)]
    pub services: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dependency {
    pub id: String,
    pub path: String,
}

impl Dependency {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

impl Manifest {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Merge `candidate` into the record with the same id, or append it.
    ///
    /// Dependencies from the candidate come first and win on id clashes, so
    /// a regenerated file's new path replaces the old one. The merged record
    /// keeps its position in the list. Merging the same candidate twice
    /// changes nothing the second time.
    pub fn merge_component(&mut self, candidate: Component) -> &Component {
        let index = match self.components.iter().position(|c| c.id == candidate.id) {
            Some(index) => {
                let previous = std::mem::take(&mut self.components[index]);
                self.components[index] = Component {
                    models: merge_dependencies(candidate.models, previous.models),
                    services: merge_dependencies(candidate.services, previous.services),
                    ..candidate
                };
                index
            }
            None => {
                self.components.push(Component {
                    models: merge_dependencies(candidate.models, Vec::new()),
                    services: merge_dependencies(candidate.services, Vec::new()),
                    ..candidate
                });
                self.components.len() - 1
            }
        };
        &self.components[index]
    }
}

/// `new ++ old`, keeping the first occurrence of each identical descriptor.
///
/// Descriptors are compared whole, so an id recorded again under another
/// path keeps both entries, the new one first.
pub fn merge_dependencies(new: Vec<Dependency>, old: Vec<Dependency>) -> Vec<Dependency> {
    let mut seen = HashSet::new();
    new.into_iter()
        .chain(old)
        .filter(|dep| seen.insert(dep.clone()))
        .collect()
}

/// Reads and writes the manifest of one project directory.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            path: project_dir.join(MANIFEST_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<Manifest, ManifestError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::Missing(self.path.clone())
            } else {
                ManifestError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let content = serde_yaml::to_string(manifest).map_err(ManifestError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Write a fresh manifest, replacing any existing one.
    pub fn init(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        if self.exists() {
            tracing::warn!(path = %self.path.display(), "overwriting existing manifest");
        }
        self.save(manifest)
    }

    /// Load, merge `candidate` into it, and persist. Returns the merged record.
    pub fn merge_and_save(&self, candidate: Component) -> Result<Component, ManifestError> {
        let mut manifest = self.load()?;
        let merged = manifest.merge_component(candidate).clone();
        self.save(&manifest)?;
        tracing::info!(
            component = %merged.id,
            models = merged.models.len(),
            services = merged.services.len(),
            "manifest updated"
        );
        Ok(merged)
    }
}
