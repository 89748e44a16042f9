//! Value bindings a template is rendered against.

use gtmpl::Value;
use std::collections::{BTreeMap, HashMap};

/// A single bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Feature flag, e.g. `Login`.
    Flag(bool),
    /// Identifier, e.g. `ModuleName`.
    Scalar(String),
}

impl Binding {
    pub fn is_truthy(&self) -> bool {
        match self {
            Binding::Flag(enabled) => *enabled,
            Binding::Scalar(s) => !s.is_empty(),
        }
    }
}

impl From<&Binding> for Value {
    fn from(binding: &Binding) -> Self {
        match binding {
            Binding::Flag(enabled) => Value::Bool(*enabled),
            Binding::Scalar(s) => Value::String(s.clone()),
        }
    }
}

/// Named values a template is rendered against.
///
/// Built with typed setters so a feature flag can never be mistaken for an
/// identifier:
///
/// ```
/// use alchemy::template::Bindings;
///
/// let bindings = Bindings::new()
///     .flag("Login", true)
///     .scalar("ModuleName", "example.com/shop");
/// assert!(bindings.is_enabled("Login"));
/// assert!(!bindings.is_enabled("Register"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a boolean feature flag.
    pub fn flag(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.set_flag(name, enabled);
        self
    }

    /// Bind a scalar identifier (module name, project name, ...).
    pub fn scalar(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_scalar(name, value);
        self
    }

    pub fn set_flag(&mut self, name: impl Into<String>, enabled: bool) {
        self.values.insert(name.into(), Binding::Flag(enabled));
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), Binding::Scalar(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.values.get(name)
    }

    /// Whether `name` is bound to something truthy. Unbound names are not.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(Binding::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The render context: every binding, plus an empty string for each
    /// `referenced` field nothing binds. An empty string prints as nothing
    /// and is false in conditions.
    pub(crate) fn context<'a>(&self, referenced: impl IntoIterator<Item = &'a str>) -> Value {
        let mut map: HashMap<String, Value> = referenced
            .into_iter()
            .map(|field| (field.to_string(), Value::String(String::new())))
            .collect();
        for (name, binding) in &self.values {
            map.insert(name.clone(), binding.into());
        }
        Value::Map(map)
    }
}
