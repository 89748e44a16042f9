//! Template artifact resolution and fetching.
//!
//! Template references are `/`-separated relative paths such as
//! `orms/prisma/user.go`. They are resolved against a [`TemplateBase`]: a
//! local directory (a checkout of the template repository) or an HTTP(S)
//! origin serving raw files.
//!
//! ```text
//! orms/prisma/user.go + /tmp/proj          → /tmp/proj/orms/prisma/user.go
//! orms/prisma/user.go + https://host/repo/ → https://host/repo/orms/prisma/user.go
//! ```
//!
//! The base comes from the `ALCHEMY_TMPL_DIR` environment variable, else the
//! `template_base` config key, else [`DEFAULT_TEMPLATE_BASE`]. A relative local
//! base is made absolute when the base is constructed, so resolution never
//! depends on the working directory afterwards.
//!
//! Remote fetches block and carry no timeout or retry: a hung request hangs
//! the run.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Environment variable overriding the template base.
pub const TEMPLATE_BASE_ENV: &str = "ALCHEMY_TMPL_DIR";

/// Where templates come from when nothing overrides it.
pub const DEFAULT_TEMPLATE_BASE: &str =
    "https://raw.githubusercontent.com/struckchure/go-alchemy/refs/heads/main/";

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("template base is empty")]
    EmptyBase,
    #[error("template reference is empty")]
    EmptyReference,
    #[error("malformed template base URL `{base}`: {source}")]
    MalformedBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme in template base `{0}` (expected http, https or a local path)")]
    UnsupportedScheme(String),
    #[error("cannot make template base `{base}` absolute: {source}")]
    InvalidLocalBase {
        base: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("permission denied reading template: {0}")]
    PermissionDenied(String),
    #[error("failed to read template {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to fetch template {location}: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch template {location}: status {status}")]
    Status { location: String, status: u16 },
    #[error("template {0} is not valid UTF-8")]
    InvalidEncoding(String),
}

/// Where template references are resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateBase {
    Local(PathBuf),
    Remote(Url),
}

/// A resolved template location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    Local(PathBuf),
    Remote(Url),
}

impl ResolvedLocation {
    pub fn is_remote(&self) -> bool {
        matches!(self, ResolvedLocation::Remote(_))
    }

    /// Last path segment, used to name the compiled template in errors.
    pub fn file_name(&self) -> String {
        match self {
            ResolvedLocation::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ResolvedLocation::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedLocation::Local(path) => write!(f, "{}", path.display()),
            ResolvedLocation::Remote(url) => write!(f, "{}", url),
        }
    }
}

impl TemplateBase {
    /// Classify and validate a base string.
    pub fn parse(base: &str) -> Result<Self, ResolveError> {
        let base = base.trim();
        if base.is_empty() {
            return Err(ResolveError::EmptyBase);
        }

        let lower = base.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(base).map_err(|source| ResolveError::MalformedBase {
                base: base.to_string(),
                source,
            })?;
            if url.cannot_be_a_base() || url.host_str().is_none() {
                return Err(ResolveError::MalformedBase {
                    base: base.to_string(),
                    source: url::ParseError::EmptyHost,
                });
            }
            return Ok(TemplateBase::Remote(url));
        }
        if base.contains("://") {
            return Err(ResolveError::UnsupportedScheme(base.to_string()));
        }

        let path = std::path::absolute(Path::new(base)).map_err(|source| {
            ResolveError::InvalidLocalBase {
                base: base.to_string(),
                source,
            }
        })?;
        Ok(TemplateBase::Local(path))
    }

    /// Pick the base: environment override, then configured value, then default.
    pub fn select(configured: Option<&str>) -> Result<Self, ResolveError> {
        let from_env = std::env::var(TEMPLATE_BASE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        let chosen = from_env
            .as_deref()
            .or(configured.filter(|v| !v.trim().is_empty()))
            .unwrap_or(DEFAULT_TEMPLATE_BASE);
        Self::parse(chosen)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TemplateBase::Remote(_))
    }

    /// Join `reference` onto this base.
    pub fn resolve(&self, reference: &str) -> Result<ResolvedLocation, ResolveError> {
        let segments: Vec<&str> = reference
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if segments.is_empty() {
            return Err(ResolveError::EmptyReference);
        }

        match self {
            TemplateBase::Local(root) => {
                let mut path = root.clone();
                for segment in segments {
                    if segment == ".." {
                        path.pop();
                    } else {
                        path.push(segment);
                    }
                }
                Ok(ResolvedLocation::Local(path))
            }
            TemplateBase::Remote(base) => {
                let mut joined: Vec<&str> = base
                    .path()
                    .split('/')
                    .filter(|s| !s.is_empty() && *s != ".")
                    .collect();
                for segment in segments {
                    if segment == ".." {
                        joined.pop();
                    } else {
                        joined.push(segment);
                    }
                }
                let mut url = base.clone();
                url.set_path(&format!("/{}", joined.join("/")));
                Ok(ResolvedLocation::Remote(url))
            }
        }
    }
}

impl fmt::Display for TemplateBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateBase::Local(path) => write!(f, "{}", path.display()),
            TemplateBase::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Resolves and fetches template artifacts from one base.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    base: TemplateBase,
    client: Option<Client>,
}

impl TemplateSource {
    pub fn new(base: TemplateBase) -> Self {
        // Only remote bases need an HTTP client.
        let client = base.is_remote().then(Client::new);
        Self { base, client }
    }

    pub fn base(&self) -> &TemplateBase {
        &self.base
    }

    pub fn resolve(&self, reference: &str) -> Result<ResolvedLocation, ResolveError> {
        self.base.resolve(reference)
    }

    /// Read the raw text at a resolved location.
    pub fn fetch(&self, location: &ResolvedLocation) -> Result<String, FetchError> {
        tracing::debug!(%location, "fetching template");
        match location {
            ResolvedLocation::Local(path) => read_local(path),
            ResolvedLocation::Remote(url) => {
                let client = match &self.client {
                    Some(client) => client.clone(),
                    None => Client::new(),
                };
                read_remote(&client, url)
            }
        }
    }
}

fn read_local(path: &Path) -> Result<String, FetchError> {
    let location = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => FetchError::NotFound(location.clone()),
        io::ErrorKind::PermissionDenied => FetchError::PermissionDenied(location.clone()),
        _ => FetchError::Io {
            location: location.clone(),
            source,
        },
    })?;
    String::from_utf8(bytes).map_err(|_| FetchError::InvalidEncoding(location))
}

fn read_remote(client: &Client, url: &Url) -> Result<String, FetchError> {
    let location = url.to_string();
    let transport = |source| FetchError::Transport {
        location: location.clone(),
        source,
    };

    let response = client.get(url.clone()).send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(match status {
            StatusCode::NOT_FOUND => FetchError::NotFound(location),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                FetchError::PermissionDenied(location)
            }
            _ => FetchError::Status {
                location,
                status: status.as_u16(),
            },
        });
    }
    let bytes = response.bytes().map_err(transport)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::InvalidEncoding(location))
}
