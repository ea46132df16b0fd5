use http::Method;
use std::fmt;

use crate::error::RouteError;
use crate::macros::{MacroMap, Template};
use crate::path::{format_path, FORMAT_PLACEHOLDER};

/// Method name shown for offline routes.
pub const METHOD_NONE: &str = "NONE";

/// One registered route.
///
/// Owns the compiled [`Template`] and the handler chain. Begin and done
/// handlers are staged separately and spliced around the main handlers by
/// [`Route::build_handlers`].
#[derive(Debug, Clone)]
pub struct Route<H> {
    /// Unique name used for reverse routing, `GET/users/:id` by default
    pub name: String,
    /// HTTP method, `None` for an offline route
    pub method: Option<Method>,
    /// Subdomain selector (`admin.`, `*.` or empty)
    pub subdomain: String,
    /// Cleaned path in bare syntax, e.g. `/users/:id`
    pub path: String,
    /// `path` with every parameter replaced by `{}`
    pub formatted_path: String,
    handlers: Vec<H>,
    begin_handlers: Vec<H>,
    done_handlers: Vec<H>,
    tmpl: Template,
}

impl<H> Route<H> {
    /// Compile `raw_path` and build a route around it.
    ///
    /// # Errors
    ///
    /// Template errors from [`Template::compile`], or
    /// [`RouteError::EmptyHandlers`] when `handlers` is empty.
    pub fn new(
        method: Option<Method>,
        subdomain: &str,
        raw_path: &str,
        handlers: Vec<H>,
        macros: &MacroMap,
    ) -> Result<Self, RouteError> {
        let tmpl = Template::compile(raw_path, macros)?;
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlers {
                path: format!("{subdomain}{raw_path}"),
            });
        }

        let path = tmpl.path.clone();
        let method_name = method.as_ref().map_or(METHOD_NONE, Method::as_str);
        Ok(Self {
            name: format!("{method_name}{subdomain}{path}"),
            formatted_path: format_path(&path),
            method,
            subdomain: subdomain.to_string(),
            path,
            handlers,
            begin_handlers: Vec::new(),
            done_handlers: Vec::new(),
            tmpl,
        })
    }

    /// The compiled template.
    #[must_use]
    pub fn tmpl(&self) -> &Template {
        &self.tmpl
    }

    /// Current handler chain. Staged handlers appear only after
    /// [`Route::build_handlers`].
    #[must_use]
    pub fn handlers(&self) -> &[H] {
        &self.handlers
    }

    /// Method name, `NONE` for offline routes.
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.method.as_ref().map_or(METHOD_NONE, Method::as_str)
    }

    /// False for routes registered with [`crate::router::Router::none`].
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.method.is_some()
    }

    /// Splice staged begin and done handlers around the main chain.
    ///
    /// The staging lists are drained, so a second call is a no-op.
    pub fn build_handlers(&mut self) {
        if !self.begin_handlers.is_empty() {
            let mut chain = std::mem::take(&mut self.begin_handlers);
            chain.append(&mut self.handlers);
            self.handlers = chain;
        }
        if !self.done_handlers.is_empty() {
            self.handlers.append(&mut self.done_handlers);
        }
    }

    /// Substitute `values` into the formatted path, left to right.
    ///
    /// Without a wildcard the value count must equal the parameter count.
    /// With one, every value past the single-segment parameters is joined
    /// with `/` into the wildcard, and at least one such value is required.
    #[must_use]
    pub fn resolve_path<S: AsRef<str>>(&self, values: &[S]) -> Option<String> {
        let dynamic = self.tmpl.dynamic_names().len();
        let has_wildcard = self.tmpl.wildcard_name().is_some();
        let expected_ok = if has_wildcard {
            values.len() > dynamic
        } else {
            values.len() == dynamic
        };
        if !expected_ok {
            return None;
        }
        if self.tmpl.is_static() {
            return Some(self.path.clone());
        }

        let (singles, tail) = values.split_at(dynamic);
        let mut out = String::with_capacity(self.formatted_path.len() + 16);
        let mut pieces = self.formatted_path.split(FORMAT_PLACEHOLDER);
        let mut singles = singles.iter();
        if let Some(first) = pieces.next() {
            out.push_str(first);
        }
        for piece in pieces {
            match singles.next() {
                Some(value) => out.push_str(value.as_ref()),
                None => {
                    let joined: Vec<&str> = tail.iter().map(AsRef::as_ref).collect();
                    out.push_str(&joined.join("/"));
                }
            }
            out.push_str(piece);
        }
        Some(out)
    }
}

impl<H: Clone> Route<H> {
    /// Stage handlers to run before the main chain.
    pub fn use_begin(&mut self, handlers: &[H]) {
        self.begin_handlers.extend_from_slice(handlers);
    }

    /// Stage handlers to run after the main chain.
    pub fn use_done(&mut self, handlers: &[H]) {
        self.done_handlers.extend_from_slice(handlers);
    }
}

impl<H> fmt::Display for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.method_name(), self.subdomain, self.tmpl.src)
    }
}
