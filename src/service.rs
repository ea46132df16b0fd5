//! HTTP-facing request resolution.
//!
//! [`Router::serve`] turns an [`http::Request`] into a [`Resolution`]: the
//! matched route, a trailing-slash redirect, a miss with its status, or a
//! 405 with the methods that would have matched. Misses carry the handlers
//! registered for their status with [`Router::on_error_code`]. Executing
//! handlers and writing responses stays with the caller.

use http::{header, Method, Request, StatusCode};
use std::borrow::Cow;
use tracing::debug;

use crate::router::{RouteMatch, Router};

/// Outcome of resolving one request.
#[derive(Debug)]
pub enum Resolution<'r, H> {
    /// A route accepted the request.
    Matched(RouteMatch<'r, H>),
    /// The path ends with `/`; redirect to the corrected location.
    Redirect {
        /// Corrected path, query string preserved
        location: String,
        /// 301 for GET and HEAD, 307 otherwise
        status: StatusCode,
    },
    /// No route accepted the request.
    NotFound {
        /// 404, or the `else` status of the last parameter that failed
        status: StatusCode,
        /// Handlers registered for `status`, if any
        handlers: Option<&'r [H]>,
    },
    /// The path matches only under other methods.
    MethodNotAllowed {
        /// Methods that would have matched
        allowed: Vec<Method>,
        /// Handlers registered for 405, if any
        handlers: Option<&'r [H]>,
    },
}

impl<'r, H> Resolution<'r, H> {
    /// Response status implied by this resolution.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Resolution::Matched(_) => StatusCode::OK,
            Resolution::Redirect { status, .. } | Resolution::NotFound { status, .. } => *status,
            Resolution::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Handler chain to run: the matched route's, or the error handlers of a
    /// miss. Redirects have none.
    #[must_use]
    pub fn handlers(&self) -> Option<&'r [H]> {
        match self {
            Resolution::Matched(m) => Some(m.handlers()),
            Resolution::Redirect { .. } => None,
            Resolution::NotFound { handlers, .. } | Resolution::MethodNotAllowed { handlers, .. } => {
                *handlers
            }
        }
    }

    /// The match, if any.
    #[must_use]
    pub fn matched(self) -> Option<RouteMatch<'r, H>> {
        match self {
            Resolution::Matched(m) => Some(m),
            _ => None,
        }
    }
}

/// Host of a request: URI authority first, then the `Host` header.
fn request_host<B>(req: &Request<B>) -> &str {
    if let Some(authority) = req.uri().authority() {
        return authority.as_str();
    }
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

impl<H> Router<H> {
    /// Resolve an HTTP request against the registered routes.
    pub fn serve<B>(&self, req: &Request<B>) -> Resolution<'_, H> {
        let method = req.method();
        let host = request_host(req);
        let raw_path = req.uri().path();
        let config = self.config();

        if !config.disable_path_correction && raw_path.len() > 1 && raw_path.ends_with('/') {
            let trimmed = raw_path.trim_end_matches('/');
            let mut location = if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            };
            if let Some(query) = req.uri().query() {
                location.push('?');
                location.push_str(query);
            }
            let status = if *method == Method::GET || *method == Method::HEAD {
                StatusCode::MOVED_PERMANENTLY
            } else {
                StatusCode::TEMPORARY_REDIRECT
            };
            debug!(method = %method, path = %raw_path, location = %location, "Path correction redirect");
            return Resolution::Redirect { location, status };
        }

        let path: Cow<'_, str> = if config.enable_path_escape {
            urlencoding::decode(raw_path).unwrap_or(Cow::Borrowed(raw_path))
        } else {
            Cow::Borrowed(raw_path)
        };

        match self.resolve(method, host, &path) {
            Ok(m) => Resolution::Matched(m),
            Err(code) => {
                if config.fire_method_not_allowed {
                    let allowed = self.allowed_methods(method, host, &path);
                    if !allowed.is_empty() {
                        return Resolution::MethodNotAllowed {
                            allowed,
                            handlers: self.error_handlers(StatusCode::METHOD_NOT_ALLOWED.as_u16()),
                        };
                    }
                }
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::NOT_FOUND);
                Resolution::NotFound {
                    status,
                    handlers: self.error_handlers(status.as_u16()),
                }
            }
        }
    }
}
