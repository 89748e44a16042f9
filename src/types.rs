//! Shared types passed between the orchestrator and component planners.

use crate::template::{Bindings, Functions};
use std::path::PathBuf;

/// Which list of a component record a generated file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Model,
    Service,
}

/// The manifest entry a job contributes when it succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provides {
    pub kind: DependencyKind,
    /// Dependency id as recorded in the manifest, e.g. `Login` or `UserDao`.
    pub id: String,
}

/// One template rendered to one file.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// Stable job id, usually the same as the dependency id it provides.
    pub id: String,
    /// Template reference resolved against the template base.
    pub source: String,
    /// Output path, relative to the component root.
    pub destination: PathBuf,
    pub bindings: Bindings,
    /// Run the source formatter over the written file.
    pub format: bool,
    /// Functions available to this job on top of the standard set.
    pub functions: Functions,
    pub provides: Option<Provides>,
}

impl GenerationJob {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<PathBuf>,
        bindings: Bindings,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            bindings,
            format: true,
            functions: Functions::new(),
            provides: None,
        }
    }

    pub fn unformatted(mut self) -> Self {
        self.format = false;
        self
    }

    pub fn providing(mut self, kind: DependencyKind, id: impl Into<String>) -> Self {
        self.provides = Some(Provides {
            kind,
            id: id.into(),
        });
        self
    }
}
