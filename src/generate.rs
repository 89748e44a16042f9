//! Generation orchestration: `add` and `init`.
//!
//! # Add
//!
//! ```text
//! alchemy.yaml ─┐
//!               ├─ plan(sub) ─→ [job, job, …] ─→ merge record ─→ alchemy.yaml
//! go.mod ───────┘                  │
//!                                  └─ resolve → fetch → preprocess → render → write (→ format)
//! ```
//!
//! Sub-components run one after another; each plan sees the manifest as the
//! previous one left it, so later sub-components render with earlier features
//! enabled. Jobs within a plan run strictly in order and the first failure
//! aborts the whole run. Files already written stay written and the manifest
//! is only updated for sub-components whose jobs all succeeded.
//!
//! The post-generate hook runs once, after every sub-component.
//!
//! # Init
//!
//! Writes a fresh manifest for the chosen ORM and database provider,
//! optionally renders a `docker-compose.yaml` for the database, then runs the
//! same hook.

use crate::catalog::{Catalog, OrmKind, UnknownOrm};
use crate::components::{PlanContext, PlanError, Registry};
use crate::config::{ConfigError, EngineConfig};
use crate::format::{CommandFormatter, SourceFormatter};
use crate::hooks::{CommandHook, HookError, PostGenerateHook};
use crate::manifest::{Component, Manifest, ManifestError, ManifestStore, Orm};
use crate::preprocess::{PreprocessError, preprocess};
use crate::project::{self, ProjectError};
use crate::resolve::{FetchError, ResolveError, TemplateBase, TemplateSource};
use crate::selector::{ComponentRequest, Selection};
use crate::template::{Bindings, Engine, TemplateError};
use crate::types::GenerationJob;
use crate::write::{WriteError, write_output};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Template rendered by `init` when a database container is requested.
pub const DOCKER_COMPOSE_TEMPLATE: &str = "_templates/docker-compose.yaml.tmpl";
pub const DOCKER_COMPOSE_OUTPUT: &str = "docker-compose.yaml";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    UnsupportedOrm(#[from] UnknownOrm),
    #[error("database provider `{provider}` is not supported by {orm} (expected one of: {})", .orm.database_providers().join(", "))]
    UnsupportedProvider { orm: OrmKind, provider: String },
    #[error("unknown component category `{0}`")]
    UnknownCategory(String),
    #[error("component category `{0}` is not available yet")]
    CategoryUnavailable(String),
    #[error("component `{component}` is not available in `{category}`")]
    UnknownComponent { category: String, component: String },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to preprocess {template}: {source}")]
    Preprocess {
        template: String,
        #[source]
        source: PreprocessError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<PlanError> for GenerateError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::UnsupportedComponent {
                category,
                component,
            } => GenerateError::UnknownComponent {
                category,
                component,
            },
        }
    }
}

/// A file produced by one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub job_id: String,
    pub path: PathBuf,
    pub formatted: bool,
}

/// Result of generating one sub-component.
#[derive(Debug, Clone)]
pub struct ComponentReport {
    /// `Category.Component`
    pub id: String,
    pub files: Vec<WrittenFile>,
    /// The record as persisted after merging.
    pub record: Component,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub project_dir: PathBuf,
    pub components: Vec<ComponentReport>,
    /// Description of the hook that ran, if any.
    pub hook: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Component root relative to the project; `.` when unset.
    pub root: Option<String>,
    pub orm: String,
    pub database_provider: String,
    pub provision_database: bool,
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub compose_file: Option<PathBuf>,
    pub hook: Option<String>,
}

/// Runs generations against one project directory.
pub struct Generator {
    project_dir: PathBuf,
    source: TemplateSource,
    engine: Engine,
    catalog: Catalog,
    registry: Registry,
    store: ManifestStore,
    formatter: Option<Box<dyn SourceFormatter>>,
    hook: Option<Box<dyn PostGenerateHook>>,
}

impl Generator {
    /// A generator with the standard catalog and registry, `gofmt` as
    /// formatter and `go mod tidy` as hook.
    pub fn new(project_dir: impl Into<PathBuf>, base: TemplateBase) -> Self {
        let project_dir = project_dir.into();
        Self {
            store: ManifestStore::new(&project_dir),
            project_dir,
            source: TemplateSource::new(base),
            engine: Engine::new(),
            catalog: Catalog::standard(),
            registry: Registry::standard(),
            formatter: Some(Box::new(CommandFormatter::default())),
            hook: Some(Box::new(CommandHook::go_mod_tidy())),
        }
    }

    /// A generator configured from `alchemy.toml` settings.
    pub fn from_config(
        project_dir: impl Into<PathBuf>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        let base = config.template_base()?;
        let generator = Self::new(project_dir, base)
            .with_formatter(
                config
                    .formatter()
                    .map(|f| Box::new(f) as Box<dyn SourceFormatter>),
            )
            .with_hook(
                config
                    .post_generate_hook()
                    .map(|h| Box::new(h) as Box<dyn PostGenerateHook>),
            );
        Ok(generator)
    }

    pub fn with_formatter(mut self, formatter: Option<Box<dyn SourceFormatter>>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_hook(mut self, hook: Option<Box<dyn PostGenerateHook>>) -> Self {
        self.hook = hook;
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn template_base(&self) -> &TemplateBase {
        self.source.base()
    }

    /// Generate the requested sub-components and record them in the manifest.
    pub fn add(&self, request: &ComponentRequest) -> Result<GenerationReport, GenerateError> {
        let manifest = self.store.load()?;
        let orm: OrmKind = manifest.orm.name.parse()?;

        let category = self
            .catalog
            .category(&request.category)
            .ok_or_else(|| GenerateError::UnknownCategory(request.category.clone()))?;
        let handler = self
            .registry
            .get(category.id)
            .ok_or_else(|| GenerateError::CategoryUnavailable(category.id.to_string()))?;

        let selected: Vec<&'static str> = match &request.selection {
            Selection::One(name) => vec![category.component(name).ok_or_else(|| {
                GenerateError::UnknownComponent {
                    category: category.id.to_string(),
                    component: name.clone(),
                }
            })?],
            Selection::All => category.components.to_vec(),
        };
        if selected.is_empty() {
            return Err(GenerateError::CategoryUnavailable(category.id.to_string()));
        }

        let module_name = project::module_name(&self.project_dir)?;
        let project_name = if manifest.project_name.is_empty() {
            project::directory_name(&self.project_dir)?
        } else {
            manifest.project_name.clone()
        };
        let root = self.component_root(&manifest.root);

        let mut components = Vec::new();
        let mut current = manifest;
        for component in selected {
            let id = format!("{}.{}", category.id, component);
            tracing::info!(component = %id, "generating");

            let ctx = PlanContext {
                module_name: &module_name,
                project_name: &project_name,
                orm,
                root: &current.root,
                existing: current.component(category.id),
            };
            let plan = handler.plan(component, &ctx)?;

            let mut files = Vec::new();
            for job in &plan.jobs {
                files.push(self.run_job(&root, job)?);
            }

            let record = self.store.merge_and_save(plan.record)?;
            current.merge_component(record.clone());
            components.push(ComponentReport { id, files, record });
        }

        let hook = self.run_hook()?;
        Ok(GenerationReport {
            project_dir: self.project_dir.clone(),
            components,
            hook,
        })
    }

    /// Write a fresh manifest and optionally a database compose file.
    pub fn init(&self, options: &InitOptions) -> Result<InitReport, GenerateError> {
        let orm: OrmKind = options.orm.parse()?;
        let provider = orm
            .database_provider(&options.database_provider)
            .ok_or_else(|| GenerateError::UnsupportedProvider {
                orm,
                provider: options.database_provider.clone(),
            })?;

        let project_name = project::directory_name(&self.project_dir)?;
        let root = options
            .root
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(".")
            .to_string();

        let manifest = Manifest {
            project_name: project_name.clone(),
            root,
            orm: Orm {
                name: orm.name().to_string(),
                database_provider: provider.to_string(),
            },
            components: Vec::new(),
        };
        self.store.init(&manifest)?;
        tracing::info!(path = %self.store.path().display(), "manifest written");

        let compose_file = if options.provision_database {
            let bindings = Bindings::new()
                .scalar("ProjectName", project_name)
                .scalar("DatabaseProvider", provider.to_lowercase());
            let job = GenerationJob::new(
                "DockerCompose",
                DOCKER_COMPOSE_TEMPLATE,
                DOCKER_COMPOSE_OUTPUT,
                bindings,
            )
            .unformatted();
            Some(self.run_job(&self.project_dir, &job)?.path)
        } else {
            None
        };

        let hook = self.run_hook()?;
        Ok(InitReport {
            manifest_path: self.store.path().to_path_buf(),
            manifest,
            compose_file,
            hook,
        })
    }

    /// Resolve, fetch, preprocess, render, and write one job under `root`.
    pub fn run_job(&self, root: &Path, job: &GenerationJob) -> Result<WrittenFile, GenerateError> {
        let location = self.source.resolve(&job.source)?;
        let raw = self.source.fetch(&location)?;
        let name = location.file_name();

        let text = preprocess(&raw).map_err(|source| GenerateError::Preprocess {
            template: location.to_string(),
            source,
        })?;
        tracing::debug!(job = %job.id, template = %location, "preprocessed");

        let rendered = if job.functions.is_empty() {
            self.engine.render_str(&name, &text, &job.bindings)?
        } else {
            self.engine
                .clone()
                .with_functions(&job.functions)
                .render_str(&name, &text, &job.bindings)?
        };

        let path = root.join(&job.destination);
        let formatter = if job.format {
            self.formatter.as_deref()
        } else {
            None
        };
        write_output(&path, &rendered, formatter)?;
        tracing::info!(job = %job.id, path = %path.display(), "wrote file");

        Ok(WrittenFile {
            job_id: job.id.clone(),
            path,
            formatted: formatter.is_some(),
        })
    }

    fn component_root(&self, root: &str) -> PathBuf {
        match root.trim() {
            "" | "." => self.project_dir.clone(),
            root => self.project_dir.join(root),
        }
    }

    fn run_hook(&self) -> Result<Option<String>, GenerateError> {
        let Some(hook) = &self.hook else {
            return Ok(None);
        };
        hook.run(&self.project_dir)?;
        Ok(Some(hook.describe()))
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("project_dir", &self.project_dir)
            .field("template_base", self.source.base())
            .field("registry", &self.registry)
            .field("formatter", &self.formatter.is_some())
            .field("hook", &self.hook.as_ref().map(|h| h.describe()))
            .finish()
    }
}
