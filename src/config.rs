//! Engine configuration (`alchemy.toml`).
//!
//! The file is optional and lives in the project directory next to
//! `alchemy.yaml`. User values are merged over stock defaults, unknown keys
//! are rejected, and the result is validated.
//!
//! ```toml
//! # template_base = "https://example.com/templates/"
//!
//! [formatter]
//! enabled = true
//! command = "gofmt"
//! args = []
//!
//! [hooks]
//! post_generate = ["go", "mod", "tidy"]
//! ```
//!
//! ## Template Base Precedence
//!
//! 1. `ALCHEMY_TMPL_DIR` environment variable
//! 2. `template_base` in `alchemy.toml`
//! 3. The public template repository
//!
//! Run `alchemy gen-config` for the documented stock file.

use crate::format::CommandFormatter;
use crate::hooks::CommandHook;
use crate::resolve::{ResolveError, TemplateBase};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "alchemy.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to serialize defaults: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    TemplateBase(#[from] ResolveError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Where templates are fetched from. `ALCHEMY_TMPL_DIR` wins over this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_base: Option<String>,
    pub formatter: FormatterConfig,
    pub hooks: HooksConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    pub enabled: bool,
    /// Program that reads source on stdin and writes it formatted to stdout.
    pub command: String,
    pub args: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "gofmt".into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HooksConfig {
    /// Argv run in the project directory after generation. Empty disables it.
    pub post_generate: Vec<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            post_generate: vec!["go".into(), "mod".into(), "tidy".into()],
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formatter.enabled && self.formatter.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "formatter.command must not be empty while the formatter is enabled".into(),
            ));
        }
        if self
            .hooks
            .post_generate
            .first()
            .is_some_and(|program| program.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "hooks.post_generate must start with a program name".into(),
            ));
        }
        if let Some(base) = &self.template_base {
            TemplateBase::parse(base)?;
        }
        Ok(())
    }

    /// Effective template base after applying the environment override.
    pub fn template_base(&self) -> Result<TemplateBase, ConfigError> {
        Ok(TemplateBase::select(self.template_base.as_deref())?)
    }

    /// `None` when formatting is switched off.
    pub fn formatter(&self) -> Option<CommandFormatter> {
        self.formatter.enabled.then(|| {
            CommandFormatter::new(self.formatter.command.clone(), self.formatter.args.clone())
        })
    }

    /// `None` when the hook list is empty.
    pub fn post_generate_hook(&self) -> Option<CommandHook> {
        CommandHook::from_argv(&self.hooks.post_generate)
    }
}

/// The stock defaults as a TOML table, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(EngineConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `alchemy.toml` from `dir` as a raw value; `None` if absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(dir: &Path) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Fully commented stock `alchemy.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Alchemy Configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Place this file next to alchemy.yaml in your project.
# Unknown keys will cause an error.

# Where template artifacts are fetched from: a local directory or an
# http(s) URL. The ALCHEMY_TMPL_DIR environment variable takes precedence.
# Defaults to the public template repository.
# template_base = "https://raw.githubusercontent.com/struckchure/go-alchemy/refs/heads/main/"

# ---------------------------------------------------------------------------
# Source formatting
# ---------------------------------------------------------------------------
[formatter]
# Run generated Go files through a formatter after writing them.
enabled = true

# Program that reads source on stdin and prints formatted source on stdout.
command = "gofmt"
args = []

# ---------------------------------------------------------------------------
# Hooks
# ---------------------------------------------------------------------------
[hooks]
# Command run in the project directory once generation finishes.
# Set to [] to disable.
post_generate = ["go", "mod", "tidy"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.formatter.enabled);
        assert_eq!(config.formatter.command, "gofmt");
        assert_eq!(config.hooks.post_generate, vec!["go", "mod", "tidy"]);
        assert_eq!(config.template_base, None);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), EngineConfig::default());
    }

    #[test]
    fn load_config_merges_over_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
template_base = "/srv/templates"

[formatter]
command = "goimports"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.template_base.as_deref(), Some("/srv/templates"));
        assert_eq!(config.formatter.command, "goimports");
        // Unspecified values keep their defaults
        assert!(config.formatter.enabled);
        assert_eq!(config.hooks.post_generate, vec!["go", "mod", "tidy"]);
    }

    #[test]
    fn empty_hook_list_disables_hook() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[hooks]\npost_generate = []\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert!(config.post_generate_hook().is_none());
    }

    #[test]
    fn disabled_formatter_yields_none() {
        let config = EngineConfig {
            formatter: FormatterConfig {
                enabled: false,
                ..FormatterConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(config.formatter().is_none());
        assert_eq!(
            EngineConfig::default().formatter().unwrap().command(),
            "gofmt"
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[formatter]\ncolour = true\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validation_rejects_empty_formatter_command() {
        let config = EngineConfig {
            formatter: FormatterConfig {
                command: " ".into(),
                ..FormatterConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validation_rejects_bad_template_base() {
        let config = EngineConfig {
            template_base: Some("ftp://example.com/templates".into()),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TemplateBase(ResolveError::UnsupportedScheme(_)))
        ));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[formatter]
enabled = true
command = "gofmt"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[formatter]\nenabled = false\n").unwrap();
        let merged = merge_toml(base, overlay);
        let formatter = merged.get("formatter").unwrap();
        assert_eq!(formatter.get("enabled").unwrap().as_bool(), Some(false));
        assert_eq!(formatter.get("command").unwrap().as_str(), Some("gofmt"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"post_generate = ["go", "mod", "tidy"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"post_generate = ["make"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("post_generate").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let parsed: EngineConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, EngineConfig::default());
    }
}
