//! Route groups.
//!
//! A [`Party`] shares a path prefix, a subdomain, and begin/done handlers
//! among the routes registered through it. Parties nest; a child inherits
//! everything of its parent at the time it is created.
//!
//! ```rust
//! use brrtmux::router::Router;
//! use http::Method;
//!
//! let mut router: Router<&str> = Router::new();
//! {
//!     let mut users = router.party("/users", vec!["auth"]);
//!     users.done(vec!["audit"]);
//!     users.get("/{id:int}", vec!["get_user"]).unwrap();
//!     users.party_fn("/{id:int}/posts", |posts| {
//!         posts.get("/", vec!["list_posts"])?;
//!         Ok(())
//!     }).unwrap();
//! }
//!
//! let m = router.lookup(&Method::GET, "", "/users/7/posts").unwrap();
//! assert_eq!(m.handlers(), &["auth", "list_posts", "audit"]);
//! ```

use http::Method;

use super::core::{Router, ALL_METHODS};
use super::route::Route;
use crate::error::RouteError;
use crate::path::{join_path, SUBDOMAIN_WILDCARD};

/// A group of routes under one prefix.
#[derive(Debug)]
pub struct Party<'r, H> {
    router: &'r mut Router<H>,
    relative_path: String,
    middleware: Vec<H>,
    done_handlers: Vec<H>,
}

impl<H: Clone> Router<H> {
    /// Open a party under `relative_path` with `middleware` in front of
    /// every route it registers.
    pub fn party(&mut self, relative_path: &str, middleware: Vec<H>) -> Party<'_, H> {
        Party {
            router: self,
            relative_path: join_path("/", relative_path),
            middleware,
            done_handlers: Vec::new(),
        }
    }

    /// Open a party on a subdomain: `admin` (or `admin.`) for a static
    /// subdomain, `*` for any subdomain.
    pub fn subdomain(&mut self, subdomain: &str, middleware: Vec<H>) -> Party<'_, H> {
        Party {
            router: self,
            relative_path: subdomain_label(subdomain),
            middleware,
            done_handlers: Vec::new(),
        }
    }
}

/// `admin` → `admin.`, `*` → `*.`.
fn subdomain_label(subdomain: &str) -> String {
    if subdomain == "*" {
        return SUBDOMAIN_WILDCARD.to_string();
    }
    let mut label = subdomain.trim_end_matches('/').to_string();
    if !label.ends_with('.') {
        label.push('.');
    }
    label
}

impl<'r, H: Clone> Party<'r, H> {
    /// Full prefix of this party, subdomain included.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Open a child party.
    pub fn party(&mut self, relative_path: &str, middleware: Vec<H>) -> Party<'_, H> {
        let mut chain = self.middleware.clone();
        chain.extend(middleware);
        Party {
            relative_path: join_path(&self.relative_path, relative_path),
            router: &mut *self.router,
            middleware: chain,
            done_handlers: self.done_handlers.clone(),
        }
    }

    /// Open a child party and hand it to `build`.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns.
    pub fn party_fn<F>(&mut self, relative_path: &str, build: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Party<'_, H>) -> Result<(), RouteError>,
    {
        let mut child = self.party(relative_path, Vec::new());
        build(&mut child)
    }

    /// Open a child party on a subdomain of this party's host.
    pub fn subdomain(&mut self, subdomain: &str, middleware: Vec<H>) -> Party<'_, H> {
        let mut chain = self.middleware.clone();
        chain.extend(middleware);
        let mut relative_path = subdomain_label(subdomain);
        if self.relative_path != "/" {
            relative_path.push_str(&self.relative_path);
        }
        Party {
            relative_path,
            router: &mut *self.router,
            middleware: chain,
            done_handlers: self.done_handlers.clone(),
        }
    }

    /// Add middleware for routes registered through this party from now on.
    pub fn use_handlers(&mut self, middleware: Vec<H>) {
        self.middleware.extend(middleware);
    }

    /// Add handlers to run after the main chain of routes registered from now on.
    pub fn done(&mut self, handlers: Vec<H>) {
        self.done_handlers.extend(handlers);
    }

    fn chain(&self, path: &str, handlers: Vec<H>) -> Result<Vec<H>, RouteError> {
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlers {
                path: join_path(&self.relative_path, path),
            });
        }
        let mut chain = Vec::with_capacity(self.middleware.len() + handlers.len() + self.done_handlers.len());
        chain.extend_from_slice(&self.middleware);
        chain.extend(handlers);
        chain.extend_from_slice(&self.done_handlers);
        Ok(chain)
    }

    /// Register a route under this party.
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
        let chain = self.chain(path, handlers)?;
        let full = join_path(&self.relative_path, path);
        self.router.register_route(Some(method), &full, chain)
    }

    /// Register an offline route under this party.
    ///
    /// # Errors
    ///
    /// Template errors and [`RouteError::EmptyHandlers`].
    pub fn none(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        let chain = self.chain(path, handlers)?;
        let full = join_path(&self.relative_path, path);
        self.router.register_route(None, &full, chain)
    }

    /// Register the handlers for every method.
    ///
    /// # Errors
    ///
    /// See [`Router::any`].
    pub fn any(&mut self, path: &str, handlers: Vec<H>) -> Result<&[Route<H>], RouteError> {
        let chain = self.chain(path, handlers)?;
        let full = join_path(&self.relative_path, path);
        let first = self.router.routes().len();
        for method in ALL_METHODS {
            self.router.register_route(Some(method), &full, chain.clone())?;
        }
        Ok(&self.router.routes()[first..])
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn get(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::GET, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn post(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::POST, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn put(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::PUT, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn delete(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::DELETE, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn patch(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::PATCH, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn head(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::HEAD, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn options(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::OPTIONS, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn connect(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::CONNECT, path, handlers)
    }

    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn trace(&mut self, path: &str, handlers: Vec<H>) -> Result<&mut Route<H>, RouteError> {
        self.handle(Method::TRACE, path, handlers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_label() {
        assert_eq!(subdomain_label("admin"), "admin.");
        assert_eq!(subdomain_label("admin."), "admin.");
        assert_eq!(subdomain_label("*"), "*.");
        assert_eq!(subdomain_label("*."), "*.");
    }

    #[test]
    fn test_nested_party_paths() {
        let mut router: Router<&str> = Router::new();
        let mut api = router.party("api", vec![]);
        assert_eq!(api.relative_path(), "/api");
        let v1 = api.party("/v1/", vec![]);
        assert_eq!(v1.relative_path(), "/api/v1");

        let mut admin = router.subdomain("admin", vec![]);
        assert_eq!(admin.relative_path(), "admin.");
        let users = admin.party("/users", vec![]);
        assert_eq!(users.relative_path(), "admin./users");
    }
}
