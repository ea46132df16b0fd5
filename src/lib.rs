//! # brrtmux
//!
//! **brrtmux** is an HTTP request multiplexer built on per-method radix trees,
//! with typed path templates, subdomain routing and reverse routing.
//!
//! ## Overview
//!
//! Routes are registered with a method, an optional subdomain and a path
//! template such as `/users/{id:int min(1) else 400}`. Templates are
//! compiled once at registration time; requests are then resolved against
//! the trees without any regex on the hot path.
//!
//! ## Architecture
//!
//! - **[`macros`]** - Template parsing, parameter types and validation functions
//! - **[`path`]** - Path cleaning, joining and subdomain helpers
//! - **[`router`]** - Radix trees, route registration, parties and reverse routing
//! - **[`service`]** - Resolving an [`http::Request`] with path correction and 405 handling
//! - **[`table`]** - Route tables declared in YAML, TOML or JSON
//! - **[`hot_reload`]** - Swapping in a rebuilt router when a table file changes
//! - **[`runtime_config`]** - Resolution options from the environment or a table
//! - **[`logging`]** - `tracing` subscriber setup for binaries
//! - **[`cli`]** - The `brrtmux` command line
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as Router::serve
//!     participant Trees as Method/subdomain trees
//!     participant Macros as Parameter validators
//!
//!     Client->>Service: GET /users/42/
//!     Service-->>Client: 301 /users/42 (path correction)
//!     Client->>Service: GET /users/42
//!     Service->>Trees: subdomain trees, then default tree
//!     Trees->>Macros: validate captured "42"
//!     Macros-->>Trees: accepted
//!     Trees-->>Service: RouteMatch (handlers, params)
//!     Service-->>Client: Resolution::Matched
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtmux::router::{RoutePathReverser, Router};
//! use brrtmux::service::Resolution;
//! use http::Request;
//!
//! let mut router: Router<&str> = Router::new();
//! router.get("/users/{id:int min(1)}", vec!["get_user"]).unwrap().name = "user".into();
//! router.get("/static/{file:path}", vec!["static"]).unwrap();
//! router.build();
//!
//! let req = Request::get("/users/42").body(()).unwrap();
//! match router.serve(&req) {
//!     Resolution::Matched(m) => assert_eq!(m.get_path_param("id"), Some("42")),
//!     other => panic!("unexpected {:?}", other.status()),
//! }
//!
//! let reverser = RoutePathReverser::new(&router);
//! assert_eq!(reverser.path("user", &["7"]).as_deref(), Some("/users/7"));
//! ```
//!
//! ## Template Syntax
//!
//! | Template            | Matches                                   |
//! |---------------------|-------------------------------------------|
//! | `/users`            | exactly `/users`                          |
//! | `/users/{id}`       | any single non-empty segment              |
//! | `/users/{id:int}`   | a segment of ASCII digits                 |
//! | `/files/{p:path}`   | the remainder of the path, last only      |
//! | `admin./dashboard`  | `/dashboard` on hosts starting `admin.`   |
//! | `*./profile`        | `/profile` on any subdomain               |
//!
//! Static segments beat dynamic ones, and dynamic ones beat wildcards, no
//! matter the registration order.

pub mod cli;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod macros;
pub mod path;
pub mod router;
pub mod runtime_config;
pub mod service;
pub mod table;

pub use error::RouteError;
pub use macros::{MacroMap, ParamType};
pub use router::{Party, Route, RouteMatch, RoutePathReverser, Router};
pub use runtime_config::RouterConfig;
pub use service::Resolution;
pub use table::{load_table, RouteTable};
