//! The `Authentication` category: `Login` and `Register`.
//!
//! Both sub-components render into the same files. Each run turns on its own
//! flag plus every service already recorded for the category, so generating
//! `Register` after `Login` rewrites the shared service and DAO with both
//! features present.
//!
//! | Job | Template | Output | Formatted |
//! |---|---|---|---|
//! | `Services.<Sub>` | `services/authentication.go` | `services/authentication.go` | yes |
//! | `Services.Utils` | `services/utils.go` | `services/utils.go` | yes |
//! | `Services.Jwt` | `services/jwt.go` | `services/jwt.go` | yes |
//! | `Models.User` (Prisma) | `prisma/schema.prisma` | `prisma/schema.prisma` | no |
//! | `Models.UserDao` (Prisma) | `orms/prisma/user.go` | `dao/user.go` | yes |
//! | `Models.UserDao` (Gorm) | `orms/gorm/user.go` | `dao/user.go` | yes |
//! | `Models.Utils` (Gorm) | `orms/gorm/utils.go` | `dao/utils.go` | yes |

use super::{ComponentCategory, ComponentPlan, PlanContext, PlanError};
use crate::catalog::OrmKind;
use crate::template::Bindings;
use crate::types::{DependencyKind, GenerationJob};

const COMPONENTS: &[&str] = &["Login", "Register"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Authentication;

impl Authentication {
    fn bindings(component: &str, ctx: &PlanContext<'_>) -> Bindings {
        let mut bindings = Bindings::new()
            .flag("User", true)
            .scalar("ModuleName", ctx.module_name)
            .scalar("ProjectName", ctx.project_name);
        if let Some(existing) = ctx.existing {
            for service in &existing.services {
                bindings.set_flag(service.id.clone(), true);
            }
        }
        bindings.set_flag(component, true);
        bindings
    }
}

impl ComponentCategory for Authentication {
    fn id(&self) -> &'static str {
        "Authentication"
    }

    fn plan(&self, component: &str, ctx: &PlanContext<'_>) -> Result<ComponentPlan, PlanError> {
        let Some(component) = COMPONENTS
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(component))
        else {
            return Err(PlanError::UnsupportedComponent {
                category: self.id().to_string(),
                component: component.to_string(),
            });
        };

        let bindings = Self::bindings(component, ctx);
        let job = |id: &str, source: &str, destination: &str| {
            GenerationJob::new(id, source, destination, bindings.clone())
        };

        let mut jobs = vec![
            job(
                &format!("Services.{component}"),
                "services/authentication.go",
                "services/authentication.go",
            )
            .providing(DependencyKind::Service, component),
            job("Services.Utils", "services/utils.go", "services/utils.go")
                .providing(DependencyKind::Service, "Utils"),
            job("Services.Jwt", "services/jwt.go", "services/jwt.go")
                .providing(DependencyKind::Service, "Jwt"),
        ];
        match ctx.orm {
            OrmKind::Prisma => jobs.extend([
                job("Models.User", "prisma/schema.prisma", "prisma/schema.prisma")
                    .unformatted()
                    .providing(DependencyKind::Model, "User"),
                job("Models.UserDao", "orms/prisma/user.go", "dao/user.go")
                    .providing(DependencyKind::Model, "UserDao"),
            ]),
            OrmKind::Gorm => jobs.extend([
                job("Models.UserDao", "orms/gorm/user.go", "dao/user.go")
                    .providing(DependencyKind::Model, "UserDao"),
                job("Models.Utils", "orms/gorm/utils.go", "dao/utils.go")
                    .providing(DependencyKind::Model, "Utils"),
            ]),
        }

        Ok(ComponentPlan::from_jobs(self.id(), ctx.root, jobs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Component, Dependency};
    use crate::template::Binding;

    fn ctx(orm: OrmKind, existing: Option<&Component>) -> PlanContext<'_> {
        PlanContext {
            module_name: "example.com/shop",
            project_name: "shop",
            orm,
            root: ".",
            existing,
        }
    }

    fn ids(plan: &ComponentPlan) -> Vec<&str> {
        plan.jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn prisma_login_jobs_in_order() {
        let plan = Authentication.plan("login", &ctx(OrmKind::Prisma, None)).unwrap();
        assert_eq!(
            ids(&plan),
            vec![
                "Services.Login",
                "Services.Utils",
                "Services.Jwt",
                "Models.User",
                "Models.UserDao",
            ]
        );
        let schema = &plan.jobs[3];
        assert!(!schema.format);
        assert_eq!(schema.destination.to_str(), Some("prisma/schema.prisma"));
        assert!(plan.jobs.iter().filter(|j| j.id != "Models.User").all(|j| j.format));
    }

    #[test]
    fn gorm_register_jobs_in_order() {
        let plan = Authentication.plan("Register", &ctx(OrmKind::Gorm, None)).unwrap();
        assert_eq!(
            ids(&plan),
            vec![
                "Services.Register",
                "Services.Utils",
                "Services.Jwt",
                "Models.UserDao",
                "Models.Utils",
            ]
        );
        assert_eq!(plan.jobs[3].source, "orms/gorm/user.go");
        assert_eq!(plan.jobs[4].destination.to_str(), Some("dao/utils.go"));
    }

    #[test]
    fn bindings_enable_sub_component_and_recorded_services() {
        let existing = Component {
            id: "Authentication".into(),
            path: ".".into(),
            models: vec![],
            services: vec![Dependency::new("Login", "services/authentication.go")],
        };
        let plan = Authentication
            .plan("Register", &ctx(OrmKind::Prisma, Some(&existing)))
            .unwrap();
        let bindings = &plan.jobs[0].bindings;

        assert!(bindings.is_enabled("User"));
        assert!(bindings.is_enabled("Register"));
        assert!(bindings.is_enabled("Login"));
        assert_eq!(
            bindings.get("ModuleName"),
            Some(&Binding::Scalar("example.com/shop".into()))
        );
        assert_eq!(
            bindings.get("ProjectName"),
            Some(&Binding::Scalar("shop".into()))
        );
    }

    #[test]
    fn fresh_login_leaves_register_off() {
        let plan = Authentication.plan("Login", &ctx(OrmKind::Prisma, None)).unwrap();
        assert!(!plan.jobs[0].bindings.is_enabled("Register"));
    }

    #[test]
    fn record_lists_services_and_models() {
        let plan = Authentication.plan("Login", &ctx(OrmKind::Prisma, None)).unwrap();
        let services: Vec<_> = plan.record.services.iter().map(|d| d.id.as_str()).collect();
        let models: Vec<_> = plan.record.models.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(services, vec!["Login", "Utils", "Jwt"]);
        assert_eq!(models, vec!["User", "UserDao"]);
        assert_eq!(plan.record.id, "Authentication");
    }

    #[test]
    fn unknown_sub_component_is_rejected() {
        let err = Authentication
            .plan("Logout", &ctx(OrmKind::Prisma, None))
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::UnsupportedComponent {
                category: "Authentication".into(),
                component: "Logout".into(),
            }
        );
    }
}
