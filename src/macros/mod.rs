//! # Path Template Macros
//!
//! Registered paths are written in a small template language:
//!
//! ```text
//! /users/{id:int min(1) else 400}/files/{file:path}
//! ```
//!
//! - `{name}` captures one segment as a string.
//! - `{name:type}` restricts the segment to `string`, `int`, `alphabetical`
//!   or `file`; `path` captures the rest of the path and must come last.
//! - `func(args)` calls a validation function bound at registration time.
//! - `else 400` sets the status reported when validation fails (404 by default).
//! - The legacy forms `:name` and `*name` are accepted as well.
//!
//! Parsing lives in [`parser`], per-type matchers and functions in
//! [`registry`], and [`template`] compiles both into a [`Template`] the
//! router can validate captured values with.
//!
//! ## Custom functions
//!
//! ```rust
//! use brrtmux::macros::{MacroMap, ParamType, Template};
//! use std::sync::Arc;
//!
//! let mut macros = MacroMap::default();
//! macros
//!     .macro_mut(ParamType::String)
//!     .register_func("one_of", |args| {
//!         let allowed: Vec<String> = (0..args.len())
//!             .map(|i| args.str(i))
//!             .collect::<Result<_, _>>()?;
//!         Ok(Arc::new(move |v: &str| allowed.iter().any(|a| a == v)))
//!     });
//!
//! let tmpl = Template::compile("/lang/{code one_of(en,fr)}", &macros).unwrap();
//! assert!(tmpl.validate(&["fr"]).is_ok());
//! assert_eq!(tmpl.validate(&["de"]), Err(404));
//! ```

pub mod ast;
pub mod parser;
pub mod registry;
pub mod template;

pub use ast::{FuncArg, ParamFunc, ParamType, ParameterDescriptor, DEFAULT_ERROR_CODE};
pub use parser::{parse, ParsedPath};
pub use registry::{ArgError, FuncArgs, Macro, MacroMap, Validator};
pub use template::{Template, TemplateParam};
