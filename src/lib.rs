//! # Alchemy
//!
//! A scaffolding engine that adds working features to Go projects. A feature
//! (a *component*, such as `Authentication`) is a set of annotated Go
//! templates; generating it renders each template against the project's
//! state, writes the result into the project, and records what was produced
//! in `alchemy.yaml` so later features can build on it.
//!
//! # Architecture: One Job Pipeline
//!
//! Every generated file goes through the same five steps:
//!
//! ```text
//! 1. Resolve     reference   →  location      (local path or URL under the template base)
//! 2. Fetch       location    →  artifact      (compilable example source with markers)
//! 3. Preprocess  artifact    →  template      (markers removed, directives exposed)
//! 4. Render      template    →  source        (bindings from the manifest and go.mod)
//! 5. Write       source      →  file          (then formatted, e.g. by gofmt)
//! ```
//!
//! Component categories only decide *which* jobs run and *which* bindings
//! they see; the pipeline itself knows nothing about authentication.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | Orchestrator: `add` and `init`, runs jobs and merges manifest records |
//! | [`components`] | Category registry and the job plans each category produces |
//! | [`catalog`] | Known categories, sub-components, ORMs and database providers |
//! | [`selector`] | Parses `Category` / `Category.Component` references |
//! | [`resolve`] | Template base selection, reference resolution, local and HTTP fetch |
//! | [`preprocess`] | Turns `@alchemy` comment markers into template text |
//! | [`template`] | Go `text/template` rendering over `gtmpl`, typed bindings, extension functions |
//! | [`write`] | Writes rendered files and runs the formatter over them |
//! | [`format`] | `SourceFormatter` trait and the external-command formatter |
//! | [`manifest`] | `alchemy.yaml` model, YAML persistence and record merging |
//! | [`project`] | Go module name from `go.mod`, project name from the directory |
//! | [`hooks`] | Post-generation hook (`go mod tidy` by default) |
//! | [`config`] | `alchemy.toml` loading over stock defaults, validation |
//! | [`types`] | Shared job types (`GenerationJob`, `Provides`) |
//! | [`output`] | CLI output formatting for reports |
//!
//! # Design Decisions
//!
//! ## Templates Are Compilable Go
//!
//! Template artifacts are ordinary Go files that build and run on their own.
//! Template directives hide behind `// @alchemy` comments and are exposed by
//! [`preprocess`] just before rendering. Template authors keep their editor,
//! compiler and tests; the engine pays one extra text pass per file.
//!
//! ## The Manifest Drives Rendering
//!
//! Which methods a shared file contains depends on every feature recorded in
//! `alchemy.yaml`, not only the one being added. Adding `Register` after
//! `Login` re-renders the shared DAO with both flags enabled, so regenerating
//! is always safe and always converges on the same output.
//!
//! ## Explicit Registry
//!
//! Component categories live in a [`components::Registry`] value handed to the
//! [`generate::Generator`]. There is no global table, and tests can register
//! their own categories.
//!
//! ## Formatting and Hooks Are Seams
//!
//! The formatter and the post-generation hook are traits. Production uses
//! `gofmt` and `go mod tidy`; tests plug in recording mocks and never need a
//! Go toolchain.

pub mod catalog;
pub mod components;
pub mod config;
pub mod format;
pub mod generate;
pub mod hooks;
pub mod manifest;
pub mod output;
pub mod preprocess;
pub mod project;
pub mod resolve;
pub mod selector;
pub mod template;
pub mod types;
pub mod write;

#[cfg(test)]
pub(crate) mod test_helpers;
