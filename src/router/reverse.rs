//! Reverse routing: route name + parameter values → path or URL.

use url::Url;

use super::core::Router;
use crate::path::{is_wildcard_subdomain, scheme_from_vhost};

/// Builds paths and URLs for named routes.
///
/// ```rust
/// use brrtmux::router::{RoutePathReverser, Router};
///
/// let mut router: Router<&str> = Router::new();
/// router.get("/users/{id:int}", vec!["get_user"]).unwrap().name = "user".into();
///
/// let reverser = RoutePathReverser::new(&router).with_host("example.com:443");
/// assert_eq!(reverser.path("user", &["42"]).as_deref(), Some("/users/42"));
/// assert_eq!(
///     reverser.url("user", &["42"]).as_deref(),
///     Some("https://example.com/users/42")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RoutePathReverser<'r, H> {
    router: &'r Router<H>,
    vhost: String,
    vscheme: String,
}

impl<'r, H> RoutePathReverser<'r, H> {
    /// Reverser over the routes of `router`. The host defaults to the
    /// router's configured `vhost`.
    #[must_use]
    pub fn new(router: &'r Router<H>) -> Self {
        let reverser = Self {
            router,
            vhost: String::new(),
            vscheme: String::new(),
        };
        let vhost = router.config().vhost.clone();
        if vhost.is_empty() {
            reverser
        } else {
            reverser.with_host(vhost)
        }
    }

    /// Force the URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.vscheme = scheme.into();
        self
    }

    /// Set the URL host; the scheme is derived from it unless already set.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        if self.vscheme.is_empty() {
            self.vscheme = scheme_from_vhost(&host).to_string();
        }
        let bare = host
            .strip_prefix("https://")
            .or_else(|| host.strip_prefix("http://"))
            .unwrap_or(&host);
        self.vhost = bare.to_string();
        self
    }

    /// Path of route `name` with `values` substituted in order.
    ///
    /// `None` for an unknown route or a wrong number of values.
    #[must_use]
    pub fn path(&self, name: &str, values: &[&str]) -> Option<String> {
        self.router.route(name)?.resolve_path(values)
    }

    /// Absolute URL of route `name`.
    ///
    /// Needs a host (see [`RoutePathReverser::with_host`]). For a route on
    /// the wildcard subdomain the first value is the subdomain label; a
    /// static subdomain is prefixed to the host as registered.
    #[must_use]
    pub fn url(&self, name: &str, values: &[&str]) -> Option<String> {
        if self.vhost.is_empty() || self.vscheme.is_empty() {
            return None;
        }
        let route = self.router.route(name)?;

        let (host, values) = if is_wildcard_subdomain(&route.subdomain) {
            let (label, rest) = values.split_first()?;
            (format!("{label}.{}", self.vhost), rest)
        } else {
            (format!("{}{}", route.subdomain, self.vhost), values)
        };

        let path = route.resolve_path(values)?;
        let base = Url::parse(&format!("{}://{host}", self.vscheme)).ok()?;
        base.join(&path).ok().map(String::from)
    }
}
