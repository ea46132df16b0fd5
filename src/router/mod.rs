//! # Router Module
//!
//! The router maps a request's method, host and path to a registered handler
//! chain and extracts the typed path parameters on the way.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (`/users/{id:int min(1)}`) at registration time
//! - Keeping one radix tree per method and subdomain
//! - Matching requests with static > dynamic > wildcard priority
//! - Validating captured values inline and reporting the configured status
//! - Building paths and URLs back from route names
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Build**: every registration parses and compiles the template, derives
//!    a normalized key (`/users/:`) and inserts the route index into the tree
//!    for its method and subdomain. Duplicate keys are rejected.
//!
//! 2. **Serve**: lookups walk the tree read-only, backtracking whenever a
//!    candidate's parameters fail validation, and return the route plus its
//!    parameters.
//!
//! ## Example
//!
//! ```rust
//! use brrtmux::router::Router;
//! use http::Method;
//!
//! let mut router: Router<&str> = Router::new();
//! router.get("/users/{id:int}", vec!["get_user"]).unwrap();
//! router.get("/users/me", vec!["me"]).unwrap();
//! router.build();
//!
//! let m = router.lookup(&Method::GET, "example.com", "/users/7").unwrap();
//! assert_eq!(m.handlers(), &["get_user"]);
//! assert_eq!(m.get_path_param("id"), Some("7"));
//!
//! let m = router.lookup(&Method::GET, "example.com", "/users/me").unwrap();
//! assert_eq!(m.handlers(), &["me"]);
//!
//! assert!(router.lookup(&Method::GET, "example.com", "/users/abc").is_none());
//! ```
//!
//! ## Concurrency
//!
//! Registration needs `&mut Router` and must finish before the router is
//! shared. Lookups take `&self` and allocate only the parameter list, which
//! stays on the stack for up to eight parameters.

mod core;
mod party;
mod radix;
mod reverse;
mod route;
#[cfg(test)]
mod performance_tests;

pub use core::{ParamVec, RouteMatch, Router, ALL_METHODS};
pub use party::Party;
pub use radix::{CaptureVec, Conflict, Found, RadixTree, MAX_INLINE_PARAMS};
pub use reverse::RoutePathReverser;
pub use route::{Route, METHOD_NONE};
