//! Component categories that know how to generate themselves.
//!
//! A [`ComponentCategory`] turns one sub-component name into a
//! [`ComponentPlan`]: the ordered jobs to run and the manifest record they
//! add up to. Categories live in a [`Registry`] that callers build and pass
//! around; nothing is registered globally.

mod authentication;

pub use authentication::Authentication;

use crate::catalog::OrmKind;
use crate::manifest::{Component, Dependency};
use crate::types::{DependencyKind, GenerationJob};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("`{category}` has no generator for `{component}`")]
    UnsupportedComponent { category: String, component: String },
}

/// What a category needs to know about the project to plan jobs.
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    /// Go module path from `go.mod`.
    pub module_name: &'a str,
    pub project_name: &'a str,
    pub orm: OrmKind,
    /// Component root relative to the project, as recorded in the manifest.
    pub root: &'a str,
    /// The record already in the manifest for this category, if any.
    pub existing: Option<&'a Component>,
}

/// Jobs for one sub-component plus the record they produce.
#[derive(Debug, Clone)]
pub struct ComponentPlan {
    pub jobs: Vec<GenerationJob>,
    pub record: Component,
}

impl ComponentPlan {
    /// Build the plan, deriving the record from what each job provides.
    pub fn from_jobs(category: &str, root: &str, jobs: Vec<GenerationJob>) -> Self {
        let mut record = Component {
            id: category.to_string(),
            path: root.to_string(),
            models: Vec::new(),
            services: Vec::new(),
        };
        for job in &jobs {
            let Some(provides) = &job.provides else {
                continue;
            };
            let dependency = Dependency::new(
                provides.id.clone(),
                job.destination.to_string_lossy().replace('\\', "/"),
            );
            match provides.kind {
                DependencyKind::Model => record.models.push(dependency),
                DependencyKind::Service => record.services.push(dependency),
            }
        }
        Self { jobs, record }
    }
}

pub trait ComponentCategory {
    /// Canonical category id, e.g. `Authentication`.
    fn id(&self) -> &'static str;

    fn plan(&self, component: &str, ctx: &PlanContext<'_>) -> Result<ComponentPlan, PlanError>;
}

/// Category handlers keyed by lowercase id.
#[derive(Default)]
pub struct Registry {
    categories: BTreeMap<String, Box<dyn ComponentCategory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every category this crate can generate.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Authentication));
        registry
    }

    pub fn register(&mut self, category: Box<dyn ComponentCategory>) {
        self.categories
            .insert(category.id().to_ascii_lowercase(), category);
    }

    pub fn get(&self, id: &str) -> Option<&dyn ComponentCategory> {
        self.categories
            .get(&id.to_ascii_lowercase())
            .map(|c| c.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.categories.values().map(|c| c.id()).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Bindings;

    #[test]
    fn standard_registry_has_authentication_only() {
        let registry = Registry::standard();
        assert_eq!(registry.ids(), vec!["Authentication"]);
        assert!(registry.get("AUTHENTICATION").is_some());
        assert!(registry.get("Authorization").is_none());
    }

    #[test]
    fn record_is_derived_from_providing_jobs() {
        let jobs = vec![
            GenerationJob::new("Services.Login", "services/a.go", "services/a.go", Bindings::new())
                .providing(DependencyKind::Service, "Login"),
            GenerationJob::new("Scratch", "x.go", "x.go", Bindings::new()),
            GenerationJob::new("Models.UserDao", "orms/u.go", "dao/user.go", Bindings::new())
                .providing(DependencyKind::Model, "UserDao"),
        ];
        let plan = ComponentPlan::from_jobs("Authentication", "internal", jobs);

        assert_eq!(plan.jobs.len(), 3);
        assert_eq!(plan.record.id, "Authentication");
        assert_eq!(plan.record.path, "internal");
        assert_eq!(
            plan.record.services,
            vec![Dependency::new("Login", "services/a.go")]
        );
        assert_eq!(
            plan.record.models,
            vec![Dependency::new("UserDao", "dao/user.go")]
        );
    }
}
