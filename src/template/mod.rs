//! Template rendering for preprocessed artifacts, on top of `gtmpl` (Go's
//! `text/template` for Rust). An artifact reads the same to a Go developer:
//!
//! ```text
//! import "{{ .ModuleName }}/dao"               substitution
//! {{- if .Login }} … {{- else }} … {{- end }}  conditionals (+ `else if`)
//! {{ removeSigns .ProjectName }}               function call
//! {{ .ProjectName | removeSigns }}             pipe (value becomes last argument)
//! {{/* comment */}}                            dropped
//! ```
//!
//! The engine's builtins (`not`, `and`, `or`, `eq`, `ne`, ...) are always
//! available. Anything else must be registered in [`Functions`]; unknown
//! names are rejected when the template is compiled, not when a branch
//! happens to run.
//!
//! Missing bindings never fail a render: they are false in conditions and
//! empty in output.

mod bindings;
mod functions;

pub use bindings::{Binding, Bindings};
pub use functions::{Functions, expect_args, remove_signs};
pub use gtmpl::{Func, FuncError, Value};

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template `{template}`: {message}")]
    Parse { template: String, message: String },
    #[error("template `{template}`: {message}")]
    Render { template: String, message: String },
}

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("static pattern is valid"));
static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.])\.([A-Za-z_]\w*)").expect("static pattern is valid")
});

/// Top-level fields (`.Login`, `.ModuleName`) referenced by any action.
fn referenced_fields(source: &str) -> BTreeSet<String> {
    ACTION
        .captures_iter(source)
        .filter_map(|action| action.get(1))
        .flat_map(|body| {
            FIELD
                .captures_iter(body.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// A compiled template.
pub struct Template {
    name: String,
    fields: BTreeSet<String>,
    inner: gtmpl::Template,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Compiles and renders templates with a fixed set of functions.
#[derive(Debug, Clone)]
pub struct Engine {
    functions: Functions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the [standard functions](Functions::standard).
    pub fn new() -> Self {
        Self {
            functions: Functions::standard(),
        }
    }

    /// Add `extra` on top of the current functions.
    pub fn with_functions(mut self, extra: &Functions) -> Self {
        self.functions.extend(extra);
        self
    }

    pub fn compile(&self, name: &str, source: &str) -> Result<Template, TemplateError> {
        let mut inner = gtmpl::Template::default();
        for (func_name, func) in self.functions.iter() {
            inner.add_func(func_name, func);
        }
        inner.parse(source).map_err(|e| TemplateError::Parse {
            template: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Template {
            name: name.to_string(),
            fields: referenced_fields(source),
            inner,
        })
    }

    pub fn render(&self, template: &Template, bindings: &Bindings) -> Result<String, TemplateError> {
        let context = bindings.context(template.fields.iter().map(String::as_str));
        template
            .inner
            .render(&gtmpl::Context::from(context))
            .map_err(|e| TemplateError::Render {
                template: template.name().to_string(),
                message: e.to_string(),
            })
    }

    /// Compile and render in one step.
    pub fn render_str(
        &self,
        name: &str,
        source: &str,
        bindings: &Bindings,
    ) -> Result<String, TemplateError> {
        let template = self.compile(name, source)?;
        self.render(&template, bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DAO: &str = "type IUserDao interface {
\tList() ([]User, error)
\t {{- if .Login }}
\tGetByEmail(string) (*User, error)
\t {{- end }}
\t {{- if .Register }}
\tCreate(UserCreatePayload) (*User, error)
\t {{- end }}
\tDelete(string) error
}";

    fn render(source: &str, bindings: &Bindings) -> Result<String, TemplateError> {
        Engine::new().render_str("test", source, bindings)
    }

    fn upper(args: &[Value]) -> Result<Value, FuncError> {
        expect_args("upper", args, 1)?;
        Ok(Value::String(args[0].to_string().to_uppercase()))
    }

    fn fail(_: &[Value]) -> Result<Value, FuncError> {
        Err(FuncError::Generic("boom".into()))
    }

    #[test]
    fn login_only_keeps_login_sections() {
        let bindings = Bindings::new().flag("Login", true).flag("Register", false);
        assert_eq!(
            render(DAO, &bindings).unwrap(),
            "type IUserDao interface {
\tList() ([]User, error)
\tGetByEmail(string) (*User, error)
\tDelete(string) error
}"
        );
    }

    #[test]
    fn register_only_keeps_register_sections() {
        let bindings = Bindings::new().flag("Login", false).flag("Register", true);
        assert_eq!(
            render(DAO, &bindings).unwrap(),
            "type IUserDao interface {
\tList() ([]User, error)
\tCreate(UserCreatePayload) (*User, error)
\tDelete(string) error
}"
        );
    }

    #[test]
    fn missing_flags_render_as_false() {
        let out = render(DAO, &Bindings::new()).unwrap();
        assert!(!out.contains("GetByEmail"));
        assert!(!out.contains("Create("));
    }

    #[test]
    fn substitution_of_scalars_and_missing_keys() {
        let bindings = Bindings::new().scalar("ModuleName", "example.com/shop");
        let out = render("\"{{ .ModuleName }}/dao\" {{ .Nope }}|", &bindings).unwrap();
        assert_eq!(out, "\"example.com/shop/dao\" |");
    }

    #[test]
    fn missing_key_passed_to_function_is_empty() {
        assert_eq!(render("[{{ removeSigns .Nope }}]", &Bindings::new()).unwrap(), "[]");
    }

    #[test]
    fn else_and_else_if_branches() {
        let source = "{{ if .A }}a{{ else if .B }}b{{ else }}c{{ end }}";
        assert_eq!(render(source, &Bindings::new().flag("A", true)).unwrap(), "a");
        assert_eq!(render(source, &Bindings::new().flag("B", true)).unwrap(), "b");
        assert_eq!(render(source, &Bindings::new()).unwrap(), "c");
    }

    #[test]
    fn function_call_and_pipe() {
        let bindings = Bindings::new().scalar("ProjectName", "my-shop.api");
        assert_eq!(
            render("{{ removeSigns .ProjectName }}_db", &bindings).unwrap(),
            "myshopapi_db"
        );
        assert_eq!(
            render("{{ .ProjectName | removeSigns }}", &bindings).unwrap(),
            "myshopapi"
        );
    }

    #[test]
    fn builtins() {
        let bindings = Bindings::new()
            .flag("Login", true)
            .flag("Register", false)
            .scalar("Provider", "postgresql");
        let cases = [
            ("{{ if not .Register }}y{{ end }}", "y"),
            ("{{ if and .Login .Register }}y{{ else }}n{{ end }}", "n"),
            ("{{ if or .Register .Login }}y{{ end }}", "y"),
            ("{{ if eq .Provider \"postgresql\" }}pg{{ end }}", "pg"),
            ("{{ if ne .Provider \"mysql\" }}ok{{ end }}", "ok"),
            ("{{ if or .Register .Missing }}y{{ else }}n{{ end }}", "n"),
        ];
        for (source, expected) in cases {
            assert_eq!(render(source, &bindings).unwrap(), expected, "{source}");
        }
    }

    #[test]
    fn extension_functions() {
        let engine = Engine::new().with_functions(&Functions::new().with("upper", upper));
        let out = engine
            .render_str("t", "{{ upper .Id }}", &Bindings::new().scalar("Id", "login"))
            .unwrap();
        assert_eq!(out, "LOGIN");
    }

    #[test]
    fn unknown_function_fails_at_compile_time_even_in_dead_branch() {
        let err = Engine::new()
            .compile("svc.go", "{{ if false }}{{ shout .A }}{{ end }}")
            .unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref template, .. } if template == "svc.go"));
    }

    #[test]
    fn wrong_arity_is_a_render_error() {
        let err = render("{{ removeSigns .A .B }}", &Bindings::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Render { ref template, .. } if template == "test"));
    }

    #[test]
    fn function_errors_fail_the_render() {
        let err = Engine::new()
            .with_functions(&Functions::new().with("fail", fail))
            .render_str("t", "{{ fail }}", &Bindings::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
        assert!(err.to_string().starts_with("template `t`: "));
    }

    #[test]
    fn syntax_errors_name_the_template() {
        let err = render("ok\n{{ if .A }}\nnever closed", &Bindings::new()).unwrap_err();
        match err {
            TemplateError::Parse { template, .. } => assert_eq!(template, "test"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn text_without_actions_is_untouched() {
        let source = "package dao\n\nfunc f() map[string]int { return map[string]int{} }\n";
        assert_eq!(render(source, &Bindings::new()).unwrap(), source);
    }

    #[test]
    fn referenced_fields_come_from_actions_only() {
        let fields = referenced_fields("db.User {{ if .Login }}{{ .ModuleName | removeSigns }}{{ end }}");
        assert_eq!(
            fields.into_iter().collect::<Vec<_>>(),
            vec!["Login".to_string(), "ModuleName".to_string()]
        );
    }

    #[test]
    fn compiled_template_keeps_its_name() {
        let template = Engine::new().compile("dao/user.go", "package dao\n").unwrap();
        assert_eq!(template.name(), "dao/user.go");
    }
}
