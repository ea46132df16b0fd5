//! # CLI Module
//!
//! Command-line tooling over route table files.
//!
//! ## Commands
//!
//! ```bash
//! # List every route with its name, method, subdomain and template
//! brrtmux routes --table routes.yaml
//!
//! # Resolve a request the way `Router::serve` would
//! brrtmux match --table routes.yaml --method GET --url http://admin.example.com/users/42
//!
//! # Build a path, or a URL when a host is given
//! brrtmux reverse --table routes.yaml --name user 42
//! brrtmux reverse --table routes.yaml --name user --host example.com 42
//!
//! # Compile every route; exits non-zero on the first error
//! brrtmux check --table routes.yaml
//!
//! # Print the routing table again whenever the file changes
//! brrtmux watch --table routes.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use brrtmux::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(&cli, &mut std::io::stdout())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
