//! Registration-time errors.
//!
//! Every failure the router can report happens while routes are being
//! registered: malformed templates, unknown types or functions, bad function
//! arguments and duplicate routes. Request-time outcomes (no route, failed
//! validation) are never errors, see [`crate::router::Router::lookup`].

use std::fmt;

/// Error returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Malformed template syntax.
    Parse {
        /// The registered path as written by the caller
        path: String,
        /// Byte offset of the offending character in `path`
        position: usize,
        /// What went wrong
        message: String,
    },
    /// A `{name:type}` block names a type the registry does not know.
    UnknownType {
        /// Parameter name
        param: String,
        /// The unknown type identifier
        type_name: String,
    },
    /// A parameter function is not registered for the parameter's type.
    UnknownFunction {
        /// Parameter name
        param: String,
        /// Type the function was looked up on
        type_name: String,
        /// The unknown function name
        function: String,
    },
    /// A parameter function rejected its literal arguments.
    InvalidArgument {
        /// Parameter name
        param: String,
        /// Function name
        function: String,
        /// Why the arguments were rejected
        message: String,
    },
    /// A `path` (wildcard) parameter is followed by more segments.
    WildcardNotLast {
        /// The registered path
        path: String,
    },
    /// The same parameter name appears twice in one path.
    DuplicateParam {
        /// The registered path
        path: String,
        /// The repeated name
        param: String,
    },
    /// A route was registered without any handler.
    EmptyHandlers {
        /// The registered path
        path: String,
    },
    /// Error handlers were registered for a status below 400 or above 599.
    InvalidErrorCode {
        /// The rejected status
        status: u16,
    },
    /// The method + subdomain + normalized path is already registered.
    Duplicate {
        /// HTTP method of the rejected route
        method: String,
        /// Subdomain of the rejected route (empty for the default host)
        subdomain: String,
        /// Router path of the rejected route
        path: String,
    },
}

impl RouteError {
    pub(crate) fn parse(path: &str, position: usize, message: impl Into<String>) -> Self {
        RouteError::Parse {
            path: path.to_string(),
            position,
            message: message.into(),
        }
    }

    /// True for [`RouteError::Duplicate`].
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RouteError::Duplicate { .. })
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Parse {
                path,
                position,
                message,
            } => write!(f, "invalid path template '{path}' at {position}: {message}"),
            RouteError::UnknownType { param, type_name } => write!(
                f,
                "unknown parameter type '{type_name}' for parameter '{param}'. \
                Expected one of: string, int, alphabetical, file, path"
            ),
            RouteError::UnknownFunction {
                param,
                type_name,
                function,
            } => write!(
                f,
                "unknown function '{function}' for parameter '{param}' of type '{type_name}'"
            ),
            RouteError::InvalidArgument {
                param,
                function,
                message,
            } => write!(
                f,
                "invalid arguments for '{function}' on parameter '{param}': {message}"
            ),
            RouteError::WildcardNotLast { path } => write!(
                f,
                "wildcard parameter must be the last segment of '{path}'"
            ),
            RouteError::DuplicateParam { path, param } => {
                write!(f, "parameter '{param}' is declared more than once in '{path}'")
            }
            RouteError::EmptyHandlers { path } => {
                write!(f, "route '{path}' was registered without handlers")
            }
            RouteError::InvalidErrorCode { status } => {
                write!(f, "status {status} is not an error code (expected 400-599)")
            }
            RouteError::Duplicate {
                method,
                subdomain,
                path,
            } => write!(
                f,
                "more than one route has the same registered path: {method} {subdomain}{path}"
            ),
        }
    }
}

impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err = RouteError::Duplicate {
            method: "GET".into(),
            subdomain: "admin.".into(),
            path: "/users/:id".into(),
        };
        assert!(err.is_duplicate());
        assert_eq!(
            err.to_string(),
            "more than one route has the same registered path: GET admin./users/:id"
        );
    }

    #[test]
    fn test_parse_display_carries_position() {
        let err = RouteError::parse("/a/{b", 3, "unterminated parameter");
        assert_eq!(
            err.to_string(),
            "invalid path template '/a/{b' at 3: unterminated parameter"
        );
        assert!(!err.is_duplicate());
    }
}
