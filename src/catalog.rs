//! Known component categories and ORM choices.
//!
//! | Category | Sub-components |
//! |---|---|
//! | Authentication | Login, Register |
//! | Authorization | RoleBaseAccessControl, AttributeBaseAccessControl |
//! | Products | none yet |
//! | Orders | none yet |
//! | Media | none yet |
//!
//! Names match case-insensitively; lookups hand back the canonical spelling
//! so manifests and template bindings always see `Login`, never `login`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub id: &'static str,
    pub components: &'static [&'static str],
}

impl CategoryEntry {
    /// Canonical spelling of `name` if it belongs to this category.
    pub fn component(&self, name: &str) -> Option<&'static str> {
        self.components
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<CategoryEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            categories: vec![
                CategoryEntry {
                    id: "Authentication",
                    components: &["Login", "Register"],
                },
                CategoryEntry {
                    id: "Authorization",
                    components: &["RoleBaseAccessControl", "AttributeBaseAccessControl"],
                },
                CategoryEntry {
                    id: "Products",
                    components: &[],
                },
                CategoryEntry {
                    id: "Orders",
                    components: &[],
                },
                CategoryEntry {
                    id: "Media",
                    components: &[],
                },
            ],
        }
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(name))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported ORM `{0}` (expected one of: Prisma, Gorm)")]
pub struct UnknownOrm(pub String);

/// Supported ORMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrmKind {
    Prisma,
    Gorm,
}

impl OrmKind {
    pub const ALL: [OrmKind; 2] = [OrmKind::Prisma, OrmKind::Gorm];

    pub fn name(self) -> &'static str {
        match self {
            OrmKind::Prisma => "Prisma",
            OrmKind::Gorm => "Gorm",
        }
    }

    pub fn database_providers(self) -> &'static [&'static str] {
        match self {
            OrmKind::Prisma => &[
                "PostgreSQL",
                "MySQL",
                "SQLite",
                "SQLServer",
                "MongoDB",
                "CockroachDB",
            ],
            OrmKind::Gorm => &["PostgreSQL", "MySQL", "SQLite", "SQLServer", "Clickhouse"],
        }
    }

    /// Canonical spelling of a supported provider.
    pub fn database_provider(self, name: &str) -> Option<&'static str> {
        self.database_providers()
            .iter()
            .copied()
            .find(|p| p.eq_ignore_ascii_case(name))
    }
}

impl FromStr for OrmKind {
    type Err = UnknownOrm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrmKind::ALL
            .into_iter()
            .find(|orm| orm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOrm(s.to_string()))
    }
}

impl fmt::Display for OrmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
