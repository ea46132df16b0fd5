//! Router core module - hot path for request routing.
//!
//! Routes are stored once in a `Vec<Route<H>>`; every (method, subdomain)
//! pair gets its own [`RadixTree`] whose values are indices into that vector.
//! Lookups never allocate beyond the returned parameter list, which stays
//! inline for up to [`MAX_INLINE_PARAMS`] parameters.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::radix::{RadixTree, MAX_INLINE_PARAMS};
use super::route::Route;
use crate::error::RouteError;
use crate::macros::{MacroMap, DEFAULT_ERROR_CODE};
use crate::path::{is_wildcard_subdomain, split_subdomain_and_path, strip_port};
use crate::runtime_config::RouterConfig;

/// Every method registered by [`Router::any`].
pub const ALL_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::HEAD,
    Method::PATCH,
    Method::OPTIONS,
    Method::TRACE,
];

/// Path parameters of a match, names shared with the route tree.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request to a route.
#[derive(Debug)]
pub struct RouteMatch<'r, H> {
    /// The matched route
    pub route: &'r Route<H>,
    /// Path parameters in declaration order (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
}

impl<'r, H> Clone for RouteMatch<'r, H> {
    fn clone(&self) -> Self {
        Self {
            route: self.route,
            path_params: self.path_params.clone(),
        }
    }
}

impl<'r, H> RouteMatch<'r, H> {
    /// Handler chain of the matched route.
    #[inline]
    #[must_use]
    pub fn handlers(&self) -> &'r [H] {
        self.route.handlers()
    }

    /// Get a path parameter by name
    ///
    /// Names are unique within one template, so at most one entry matches.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter values only, in declaration order.
    #[must_use]
    pub fn param_values(&self) -> Vec<&str> {
        self.path_params.iter().map(|(_, v)| v.as_str()).collect()
    }

    /// Convert path_params to HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// One tree per (method, subdomain).
#[derive(Debug, Clone)]
struct MethodTree {
    method: Method,
    subdomain: String,
    tree: RadixTree<usize>,
}

/// Request router over handlers of type `H`.
///
/// Registration (`&mut self`) must finish before the router is shared; lookups
/// (`&self`) can then run from any number of threads. To change routes at
/// runtime build a new router and swap it in, see [`crate::hot_reload`].
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
    trees: Vec<MethodTree>,
    macros: MacroMap,
    config: RouterConfig,
    begin_global: Vec<H>,
    done_global: Vec<H>,
    error_handlers: HashMap<u16, Vec<H>>,
}

impl<H: Clone> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> Router<H> {
    /// Empty router with the built-in macros and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Empty router with the given configuration.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            routes: Vec::new(),
            trees: Vec::new(),
            macros: MacroMap::default(),
            config,
            begin_global: Vec::new(),
            done_global: Vec::new(),
            error_handlers: HashMap::new(),
        }
    }

    /// Replace the macro registry. Call before registering routes.
    #[must_use]
    pub fn with_macros(mut self, macros: MacroMap) -> Self {
        self.macros = macros;
        self
    }

    /// Mutable registry, for registering custom parameter functions.
    pub fn macros_mut(&mut self) -> &mut MacroMap {
        &mut self.macros
    }

    /// Mutable resolution options.
    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    /// Register `handlers` for `method` on a (possibly subdomain-prefixed) path.
    ///
    /// # Errors
    ///
    /// Template errors, [`RouteError::EmptyHandlers`], and
    /// [`RouteError::Duplicate`] when the same method, subdomain and
    /// normalized path are already registered. A failed registration leaves
    /// the router unchanged.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handlers: Vec<H>,
    ) -> Result<&mut Route<H>, RouteError> {
        self.register_route(Some(method), path, handlers)
    }

    /// Alias of [`Router::register`].
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn handle(
        &mut self,
        method: Method,
        path: &str,
        handlers: Vec<H>,
    ) -> Result<&mut Route<H>, RouteError> {
        self.register_route(Some(method), path, handlers)
    }

    pub(crate) fn register_route(
        &mut self,
        method: Option<Method>,
        full_path: &str,
        handlers: Vec<H>,
    ) -> Result<&mut Route<H>, RouteError> {
        let (subdomain, path) = split_subdomain_and_path(full_path);
        let mut route = Route::new(method, subdomain, path, handlers, &self.macros)?;
        route.use_begin(&self.begin_global);
        route.use_done(&self.done_global);

        let idx = self.routes.len();
        if let Some(method) = &route.method {
            let tmpl = route.tmpl();
            let tree = self.tree_mut(method, subdomain);
            tree.insert(&tmpl.normalized, tmpl.dynamic_names(), tmpl.wildcard_name(), idx)
                .map_err(|_| RouteError::Duplicate {
                    method: method.to_string(),
                    subdomain: subdomain.to_string(),
                    path: route.path.clone(),
                })?;
        } else if self.routes.iter().any(|r| {
            !r.is_online()
                && r.subdomain == route.subdomain
                && r.tmpl().normalized == route.tmpl().normalized
        }) {
            // offline routes have no tree to catch the collision
            return Err(RouteError::Duplicate {
                method: route.method_name().to_string(),
                subdomain: route.subdomain.clone(),
                path: route.path.clone(),
            });
        }

        debug!(
            method = %route.method_name(),
            subdomain = %route.subdomain,
            path = %route.path,
            template = %route.tmpl().src,
            name = %route.name,
            "Route registered"
        );
        self.routes.push(route);
        Ok(&mut self.routes[idx])
    }

    fn tree_mut(&mut self, method: &Method, subdomain: &str) -> &mut RadixTree<usize> {
        let pos = self
            .trees
            .iter()
            .position(|t| t.method == *method && t.subdomain == subdomain);
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.trees.push(MethodTree {
                    method: method.clone(),
                    subdomain: subdomain.to_string(),
                    tree: RadixTree::new(),
                });
                self.trees.len() - 1
            }
        };
        &mut self.trees[pos].tree
    }

    /// Register a GET route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn get(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::GET, path, handlers)
    }

    /// Register a POST route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn post(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::POST, path, handlers)
    }

    /// Register a PUT route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn put(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::PUT, path, handlers)
    }

    /// Register a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn delete(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::DELETE, path, handlers)
    }

    /// Register a PATCH route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn patch(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::PATCH, path, handlers)
    }

    /// Register a HEAD route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn head(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::HEAD, path, handlers)
    }

    /// Register an OPTIONS route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn options(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::OPTIONS, path, handlers)
    }

    /// Register a CONNECT route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn connect(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::CONNECT, path, handlers)
    }

    /// Register a TRACE route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn trace(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register(Method::TRACE, path, handlers)
    }

    /// Register the same handlers for every method in [`ALL_METHODS`].
    ///
    /// Returns the new routes. Stops at the first failing method; routes
    /// registered before the failure stay registered.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn any(&mut self, path: &str, handlers: Vec<H>) -> Result<&[Route<H>], RouteError> {
        let first = self.routes.len();
        for method in ALL_METHODS {
            self.register(method, path, handlers.clone())?;
        }
        Ok(&self.routes[first..])
    }

    /// Register an offline route: named and reversible, never served.
    ///
    /// # Errors
    ///
    /// Template errors, [`RouteError::EmptyHandlers`], and
    /// [`RouteError::Duplicate`] when an offline route with the same
    /// subdomain and normalized path exists.
    pub fn none(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.register_route(None, path, handlers)
    }

    /// Stage `handlers` before the main chain of every route, present and future.
    pub fn use_global(&mut self, handlers: Vec<H>) {
        for route in &mut self.routes {
            route.use_begin(&handlers);
        }
        self.begin_global.extend(handlers);
    }

    /// Stage `handlers` after the main chain of every route, present and future.
    pub fn done_global(&mut self, handlers: Vec<H>) {
        for route in &mut self.routes {
            route.use_done(&handlers);
        }
        self.done_global.extend(handlers);
    }

    /// Handlers to run when a request resolves to the error `status`.
    ///
    /// A later registration for the same status replaces the earlier one;
    /// an empty list removes it. Global and party handlers are not applied.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidErrorCode`] unless `status` is in `400..=599`.
    pub fn on_error_code(&mut self, status: u16, handlers: Vec<H>) -> Result<(), RouteError> {
        if !(400..=599).contains(&status) {
            return Err(RouteError::InvalidErrorCode { status });
        }
        if handlers.is_empty() {
            self.error_handlers.remove(&status);
        } else {
            debug!(status, handlers = handlers.len(), "Error code handlers registered");
            self.error_handlers.insert(status, handlers);
        }
        Ok(())
    }

    /// Splice staged handlers into every route. Safe to call repeatedly.
    pub fn build(&mut self) {
        for route in &mut self.routes {
            route.build_handlers();
        }
        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(ToString::to_string)
            .collect();
        info!(
            routes_count = self.routes.len(),
            trees_count = self.trees.len(),
            routes_summary = ?routes_summary,
            "Routing table built"
        );
        for t in &self.trees {
            trace!(
                method = %t.method,
                subdomain = %t.subdomain,
                tree = %t.tree.dump(),
                "Route tree"
            );
        }
    }
}

impl<H> Router<H> {
    /// Registry used to compile templates.
    #[must_use]
    pub fn macros(&self) -> &MacroMap {
        &self.macros
    }

    /// Resolution options.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// All routes in registration order, offline ones included.
    #[must_use]
    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Handlers registered with [`Router::on_error_code`] for `status`.
    #[must_use]
    pub fn error_handlers(&self, status: u16) -> Option<&[H]> {
        self.error_handlers.get(&status).map(Vec::as_slice)
    }

    /// Route by name.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Route<H>> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Mutable route by name, e.g. to rename it.
    pub fn route_mut(&mut self, name: &str) -> Option<&mut Route<H>> {
        self.routes.iter_mut().find(|r| r.name == name)
    }

    /// Match a request to a route.
    ///
    /// `host` may carry a port. Returns `None` when no route accepts the
    /// request, including when a parameter fails validation.
    #[must_use]
    pub fn lookup(&self, method: &Method, host: &str, path: &str) -> Option<RouteMatch<'_, H>> {
        self.resolve(method, host, path).ok()
    }

    /// Like [`Router::lookup`] but reports the status of a miss: the `else`
    /// code of the last parameter that failed validation, or 404.
    pub fn resolve(&self, method: &Method, host: &str, path: &str) -> Result<RouteMatch<'_, H>, u16> {
        debug!(method = %method, host = %host, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let mut status = DEFAULT_ERROR_CODE;
        let result = self.find(method, host, path, &mut status);
        let match_duration = match_start.elapsed();

        match result {
            Some(m) => {
                let threshold = Duration::from_micros(self.config.slow_match_threshold_us);
                if match_duration > threshold {
                    warn!(
                        method = %method,
                        path = %path,
                        route = %m.route.name,
                        path_params = ?m.path_params,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        route = %m.route.name,
                        path_params = ?m.path_params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                Ok(m)
            }
            None => {
                debug!(
                    method = %method,
                    path = %path,
                    status,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
                Err(status)
            }
        }
    }

    /// Methods other than `except` that have a route accepting host and path.
    #[must_use]
    pub fn allowed_methods(&self, except: &Method, host: &str, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = Vec::new();
        for t in &self.trees {
            if t.method == *except || allowed.contains(&t.method) {
                continue;
            }
            let mut status = DEFAULT_ERROR_CODE;
            if self.find(&t.method, host, path, &mut status).is_some() {
                allowed.push(t.method.clone());
            }
        }
        allowed
    }

    fn find(
        &self,
        method: &Method,
        host: &str,
        path: &str,
        status: &mut u16,
    ) -> Option<RouteMatch<'_, H>> {
        let host = strip_port(host);
        let vhost = strip_port(&self.config.vhost);

        // subdomain trees first, then the default host
        let candidates = self
            .trees
            .iter()
            .filter(|t| t.method == *method && !t.subdomain.is_empty())
            .filter(|t| subdomain_matches(&t.subdomain, host, vhost))
            .chain(
                self.trees
                    .iter()
                    .filter(|t| t.method == *method && t.subdomain.is_empty()),
            );

        for t in candidates {
            let found = t.tree.find(path, |&idx, values| {
                let route = &self.routes[idx];
                match route.tmpl().validate(values) {
                    Ok(()) => true,
                    Err(code) => {
                        trace!(route = %route.name, status = code, "Parameter validation rejected");
                        *status = code;
                        false
                    }
                }
            });
            if let Some(found) = found {
                let path_params: ParamVec = found
                    .params()
                    .map(|(name, value)| (Arc::clone(name), value.to_owned()))
                    .collect();
                return Some(RouteMatch {
                    route: &self.routes[*found.value],
                    path_params,
                });
            }
        }
        None
    }
}

/// Whether a request host belongs to a registered subdomain selector.
fn subdomain_matches(subdomain: &str, host: &str, vhost: &str) -> bool {
    if is_wildcard_subdomain(subdomain) {
        if host == vhost {
            return false;
        }
        return matches!(host.find('.'), Some(dot) if dot > 0 && dot + 1 < host.len());
    }
    host.starts_with(subdomain)
}
