//! Parsing of component references like `Authentication.Login`.
//!
//! - `"Authentication.Login"` → category `Authentication`, one sub-component `Login`
//! - `"Authentication"` → every sub-component of `Authentication`
//! - `"authentication.*"`, `"Authentication.all"` → every sub-component
//!
//! Case is preserved here; canonical spelling is the catalog's job.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    #[error("component reference is empty")]
    Empty,
    #[error("component reference `{0}` has no category before the dot")]
    MissingCategory(String),
    #[error("component reference `{0}` has no component after the dot")]
    MissingComponent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    One(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRequest {
    pub category: String,
    pub selection: Selection,
}

impl ComponentRequest {
    pub fn all(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            selection: Selection::All,
        }
    }

    pub fn one(category: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            selection: Selection::One(component.into()),
        }
    }
}

impl fmt::Display for ComponentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selection {
            Selection::All => write!(f, "{}", self.category),
            Selection::One(component) => write!(f, "{}.{}", self.category, component),
        }
    }
}

/// Parse `Category[.Component]`. Only the first dot separates.
pub fn parse_component_ref(reference: &str) -> Result<ComponentRequest, SelectorError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(SelectorError::Empty);
    }

    let Some((category, component)) = reference.split_once('.') else {
        return Ok(ComponentRequest::all(reference));
    };
    let (category, component) = (category.trim(), component.trim());
    if category.is_empty() {
        return Err(SelectorError::MissingCategory(reference.to_string()));
    }
    if component.is_empty() {
        return Err(SelectorError::MissingComponent(reference.to_string()));
    }
    if component == "*" || component.eq_ignore_ascii_case("all") {
        return Ok(ComponentRequest::all(category));
    }
    Ok(ComponentRequest::one(category, component))
}
