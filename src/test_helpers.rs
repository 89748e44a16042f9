//! Shared test utilities.
//!
//! Builds throwaway Go projects in temp directories and generators that read
//! templates from `fixtures/templates/`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = setup_project("Prisma", "PostgreSQL");
//! fixture_generator(project.path())
//!     .add(&ComponentRequest::one("Authentication", "Login"))
//!     .unwrap();
//! assert!(read(project.path(), "dao/user.go").contains("GetByEmail"));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::generate::Generator;
use crate::manifest::{Manifest, ManifestStore, Orm};
use crate::resolve::TemplateBase;

/// Module path written to every test project's `go.mod`.
pub const MODULE_NAME: &str = "example.com/shop";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/templates")
}

/// A temp project with `go.mod` and an empty manifest for the given ORM.
pub fn setup_project(orm: &str, database_provider: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("go.mod"),
        format!("module {MODULE_NAME}\n\ngo 1.22\n"),
    )
    .unwrap();
    ManifestStore::new(tmp.path())
        .save(&Manifest {
            project_name: "shop".into(),
            root: ".".into(),
            orm: Orm {
                name: orm.into(),
                database_provider: database_provider.into(),
            },
            components: Vec::new(),
        })
        .unwrap();
    tmp
}

/// Generator over the fixture templates with no formatter and no hook.
pub fn fixture_generator(project_dir: &Path) -> Generator {
    Generator::new(project_dir, TemplateBase::Local(fixtures_dir()))
        .with_formatter(None)
        .with_hook(None)
}

pub fn load_manifest(project_dir: &Path) -> Manifest {
    ManifestStore::new(project_dir).load().unwrap()
}

pub fn read(project_dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(project_dir.join(relative))
        .unwrap_or_else(|e| panic!("reading {relative}: {e}"))
}
