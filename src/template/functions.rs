//! Extension functions callable from template actions.
//!
//! Functions are plain `fn` pointers in the engine's calling convention and
//! check their own argument count with [`expect_args`].

use gtmpl::{Func, FuncError, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

#[derive(Clone, Default)]
pub struct Functions {
    map: BTreeMap<String, Func>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Functions every generation job can use.
    pub fn standard() -> Self {
        Self::new().with("removeSigns", remove_signs_func)
    }

    pub fn register(&mut self, name: impl Into<String>, func: Func) {
        self.map.insert(name.into(), func);
    }

    pub fn with(mut self, name: impl Into<String>, func: Func) -> Self {
        self.register(name, func);
        self
    }

    /// Add every function of `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &Functions) {
        for (name, func) in &other.map {
            self.map.insert(name.clone(), *func);
        }
    }

    pub fn get(&self, name: &str) -> Option<Func> {
        self.map.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Func)> {
        self.map.iter().map(|(name, func)| (name.as_str(), *func))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

/// Fail unless `args` has exactly `count` entries.
pub fn expect_args(name: &str, args: &[Value], count: usize) -> Result<(), FuncError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(FuncError::Generic(format!(
            "wrong number of arguments for {name}: want {count}, got {}",
            args.len()
        )))
    }
}

fn remove_signs_func(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("removeSigns", args, 1)?;
    Ok(Value::String(remove_signs(&args[0].to_string())))
}

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("static pattern is valid"));

/// Strip every non-word character, e.g. `my-shop.api` → `myshopapi`.
///
/// Used to derive identifiers (container names, database names) from
/// free-form project names.
pub fn remove_signs(input: &str) -> String {
    NON_WORD.replace_all(input, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old(_: &[Value]) -> Result<Value, FuncError> {
        Ok(Value::String("old".into()))
    }

    fn new(_: &[Value]) -> Result<Value, FuncError> {
        Ok(Value::String("new".into()))
    }

    #[test]
    fn remove_signs_strips_non_word_characters() {
        assert_eq!(remove_signs("my-shop.api"), "myshopapi");
        assert_eq!(remove_signs("go_alchemy 2"), "go_alchemy2");
        assert_eq!(remove_signs("---"), "");
    }

    #[test]
    fn standard_remove_signs_checks_arity() {
        let f = Functions::standard().get("removeSigns").unwrap();
        let out = f(&[Value::String("a-b".into())]).unwrap();
        assert_eq!(out.to_string(), "ab");
        assert!(f(&[]).is_err());
    }

    #[test]
    fn extend_replaces_same_name() {
        let mut base = Functions::new().with("shout", old);
        base.extend(&Functions::new().with("shout", new));
        let out = base.get("shout").unwrap()(&[]).unwrap();
        assert_eq!(out.to_string(), "new");
        assert_eq!(base.iter().count(), 1);
    }
}
