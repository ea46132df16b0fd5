//! # Route Tables
//!
//! Routes can be declared in a file instead of code. Handlers are named by
//! strings, so a table builds a `Router<String>`; the application maps the
//! names to its own handler values.
//!
//! ```yaml
//! vhost: example.com
//! router:
//!   fire_method_not_allowed: true
//! begin: [request_id]
//! done: [access_log]
//! routes:
//!   - method: GET
//!     path: /users/{id:int min(1)}
//!     handlers: [auth, get_user]
//!     name: user
//!   - method: ANY
//!     path: /static/{file:path}
//!     handler: serve_static
//!   - method: NONE
//!     path: /invite/{code}
//!     handler: invite
//!     name: invite
//! errors:
//!   - status: 404
//!     handler: not_found
//! ```
//!
//! The format is picked by file extension: `.yaml`/`.yml`, `.toml` or `.json`.

use anyhow::{bail, Context, Result};
use http::Method;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::RouteError;
use crate::macros::MacroMap;
use crate::router::Router;
use crate::runtime_config::RouterConfig;

/// Method column of a table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMethod {
    /// One HTTP method
    Method(Method),
    /// Every method, see [`Router::any`]
    Any,
    /// Offline route, see [`Router::none`]
    None,
}

impl fmt::Display for TableMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableMethod::Method(m) => f.write_str(m.as_str()),
            TableMethod::Any => f.write_str("ANY"),
            TableMethod::None => f.write_str("NONE"),
        }
    }
}

impl std::str::FromStr for TableMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "ANY" => Ok(TableMethod::Any),
            "NONE" => Ok(TableMethod::None),
            "" => Err("empty method".to_string()),
            other => Method::from_bytes(other.as_bytes())
                .map(TableMethod::Method)
                .map_err(|e| format!("invalid method '{s}': {e}")),
        }
    }
}

impl<'de> Deserialize<'de> for TableMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// One route of a table.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    /// HTTP method, `ANY` or `NONE`
    pub method: TableMethod,
    /// Path template, optionally prefixed with a subdomain
    pub path: String,
    /// Handler chain
    #[serde(default)]
    pub handlers: Vec<String>,
    /// Single handler, appended after `handlers`
    #[serde(default)]
    pub handler: Option<String>,
    /// Route name for reverse routing. For `ANY` it names the GET route.
    #[serde(default)]
    pub name: Option<String>,
}

impl RouteEntry {
    fn chain(&self) -> Vec<String> {
        let mut chain = self.handlers.clone();
        chain.extend(self.handler.iter().cloned());
        chain
    }
}

/// Handlers for one error status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEntry {
    /// Status in `400..=599`
    pub status: u16,
    /// Handler chain
    #[serde(default)]
    pub handlers: Vec<String>,
    /// Single handler, appended after `handlers`
    #[serde(default)]
    pub handler: Option<String>,
}

/// A parsed route table file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteTable {
    /// Overrides `router.vhost`
    #[serde(default)]
    pub vhost: Option<String>,
    /// Resolution options
    #[serde(default)]
    pub router: Option<RouterConfig>,
    /// Handlers run before every route
    #[serde(default)]
    pub begin: Vec<String>,
    /// Handlers run after every route
    #[serde(default)]
    pub done: Vec<String>,
    /// The routes, in registration order
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Handlers for error statuses, see [`Router::on_error_code`]
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Serialization format of a table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Toml,
    Json,
}

impl TableFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(TableFormat::Yaml),
            Some("toml") => Ok(TableFormat::Toml),
            Some("json") => Ok(TableFormat::Json),
            _ => bail!(
                "unsupported route table extension for {} (expected .yaml, .yml, .toml or .json)",
                path.display()
            ),
        }
    }
}

/// Parse table contents.
pub fn parse_table(contents: &str, format: TableFormat) -> Result<RouteTable> {
    let table = match format {
        TableFormat::Yaml => serde_yaml::from_str(contents).context("invalid YAML route table")?,
        TableFormat::Toml => toml::from_str(contents).context("invalid TOML route table")?,
        TableFormat::Json => serde_json::from_str(contents).context("invalid JSON route table")?,
    };
    Ok(table)
}

/// Read and parse a table file.
pub fn load_table(path: impl AsRef<Path>) -> Result<RouteTable> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read route table {}", path.display()))?;
    let table = parse_table(&contents, format)
        .with_context(|| format!("failed to parse route table {}", path.display()))?;
    info!(
        path = %path.display(),
        routes_count = table.routes.len(),
        "Route table loaded"
    );
    Ok(table)
}

impl RouteTable {
    /// Resolution options of this table: the `router` section with `vhost`
    /// applied on top.
    #[must_use]
    pub fn config(&self) -> RouterConfig {
        let mut config = self.router.clone().unwrap_or_default();
        if let Some(vhost) = &self.vhost {
            config.vhost.clone_from(vhost);
        }
        config
    }

    /// Register every route on a new router and build it.
    ///
    /// # Errors
    ///
    /// The first registration error, see [`Router::register`] and
    /// [`Router::on_error_code`].
    pub fn build_router(&self, macros: &MacroMap) -> Result<Router<String>, RouteError> {
        let mut router = Router::with_config(self.config()).with_macros(macros.clone());
        router.use_global(self.begin.clone());
        router.done_global(self.done.clone());

        for entry in &self.routes {
            let handlers = entry.chain();
            let registered = match &entry.method {
                TableMethod::Method(method) => router.register(method.clone(), &entry.path, handlers)?.name.clone(),
                TableMethod::None => router.none(&entry.path, handlers)?.name.clone(),
                TableMethod::Any => match router.any(&entry.path, handlers)?.first() {
                    Some(route) => route.name.clone(),
                    None => continue,
                },
            };
            if let (Some(name), Some(route)) = (&entry.name, router.route_mut(&registered)) {
                route.name.clone_from(name);
            }
        }

        for entry in &self.errors {
            let mut handlers = entry.handlers.clone();
            handlers.extend(entry.handler.iter().cloned());
            router.on_error_code(entry.status, handlers)?;
        }

        router.build();
        Ok(router)
    }
}
