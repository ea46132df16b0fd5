use crate::{
    hot_reload::watch_table,
    macros::MacroMap,
    router::{RoutePathReverser, Router},
    service::Resolution,
    table::load_table,
};
use anyhow::{anyhow, Context};
use arc_swap::ArcSwap;
use clap::{Parser, Subcommand};
use http::{header, Method, Request};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for brrtmux
#[derive(Parser, Debug)]
#[command(name = "brrtmux")]
#[command(about = "Inspect and exercise brrtmux route tables", long_about = None)]
pub struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, env = "BRRTMUX_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every route of a table
    Routes {
        /// Route table file (.yaml, .yml, .toml or .json)
        #[arg(short, long)]
        table: PathBuf,
    },
    /// Resolve one request against a table
    Match {
        /// Route table file
        #[arg(short, long)]
        table: PathBuf,

        /// HTTP method
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// Request URL, absolute (`http://host/path?q`) or a bare path
        #[arg(short, long)]
        url: String,

        /// Host for a bare path
        #[arg(long)]
        host: Option<String>,
    },
    /// Build a path or URL from a route name
    Reverse {
        /// Route table file
        #[arg(short, long)]
        table: PathBuf,

        /// Route name
        #[arg(short, long)]
        name: String,

        /// Host; prints a full URL when given
        #[arg(long)]
        host: Option<String>,

        /// URL scheme, derived from the host when omitted
        #[arg(long)]
        scheme: Option<String>,

        /// Parameter values in template order
        values: Vec<String>,
    },
    /// Compile every route of a table
    Check {
        /// Route table file
        #[arg(short, long)]
        table: PathBuf,
    },
    /// Print the routes again whenever the table changes
    Watch {
        /// Route table file
        #[arg(short, long)]
        table: PathBuf,
    },
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes()).map_err(|e| e.to_string())
}

fn build_router(table: &Path) -> anyhow::Result<Router<String>> {
    let router = load_table(table)?
        .build_router(&MacroMap::default())
        .with_context(|| format!("invalid route table {}", table.display()))?;
    Ok(router)
}

fn print_routes(router: &Router<String>, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{:<32} {:<8} {:<16} TEMPLATE", "NAME", "METHOD", "SUBDOMAIN")?;
    for route in router.routes() {
        let subdomain = if route.subdomain.is_empty() {
            "-"
        } else {
            route.subdomain.as_str()
        };
        writeln!(
            out,
            "{:<32} {:<8} {:<16} {}",
            route.name,
            route.method_name(),
            subdomain,
            route.tmpl().src
        )?;
    }
    Ok(())
}

fn print_resolution(resolution: Resolution<'_, String>, out: &mut impl Write) -> std::io::Result<()> {
    match resolution {
        Resolution::Matched(m) => {
            writeln!(out, "matched {}", m.route.name)?;
            writeln!(out, "handlers: {}", m.handlers().join(" -> "))?;
            for (name, value) in &m.path_params {
                writeln!(out, "  {name} = {value}")?;
            }
        }
        Resolution::Redirect { location, status } => {
            writeln!(out, "redirect {} {location}", status.as_u16())?;
        }
        Resolution::NotFound { status, handlers } => {
            writeln!(out, "not found {}", status.as_u16())?;
            if let Some(handlers) = handlers {
                writeln!(out, "handlers: {}", handlers.join(" -> "))?;
            }
        }
        Resolution::MethodNotAllowed { allowed, handlers } => {
            let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
            writeln!(out, "method not allowed 405; allowed: {}", allowed.join(", "))?;
            if let Some(handlers) = handlers {
                writeln!(out, "handlers: {}", handlers.join(" -> "))?;
            }
        }
    }
    Ok(())
}

/// Run one parsed command, writing its output to `out`.
///
/// # Errors
///
/// Table load and build errors, unknown route names, and I/O errors on `out`.
pub fn run_cli(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Routes { table } => {
            let router = build_router(table)?;
            print_routes(&router, out)?;
        }
        Commands::Match {
            table,
            method,
            url,
            host,
        } => {
            let router = build_router(table)?;
            let mut builder = Request::builder().method(method.clone()).uri(url.as_str());
            if let Some(host) = host {
                builder = builder.header(header::HOST, host.as_str());
            }
            let request = builder
                .body(())
                .with_context(|| format!("invalid request URL '{url}'"))?;
            print_resolution(router.serve(&request), out)?;
        }
        Commands::Reverse {
            table,
            name,
            host,
            scheme,
            values,
        } => {
            let router = build_router(table)?;
            if router.route(name).is_none() {
                return Err(anyhow!("no route named '{name}'"));
            }
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            let mut reverser = RoutePathReverser::new(&router);
            if let Some(scheme) = scheme {
                reverser = reverser.with_scheme(scheme.as_str());
            }
            let reversed = match host {
                Some(host) => reverser.with_host(host.as_str()).url(name, &values),
                None => reverser.path(name, &values),
            };
            let reversed = reversed.ok_or_else(|| {
                anyhow!("route '{name}' does not accept {} value(s)", values.len())
            })?;
            writeln!(out, "{reversed}")?;
        }
        Commands::Check { table } => {
            let router = build_router(table)?;
            writeln!(out, "ok: {} routes", router.routes().len())?;
        }
        Commands::Watch { table } => {
            let router = build_router(table)?;
            print_routes(&router, out)?;
            out.flush()?;
            let live = Arc::new(ArcSwap::from_pointee(router));
            let _watcher = watch_table(table, Arc::clone(&live), |router| {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                if let Err(e) = print_routes(router, &mut lock) {
                    tracing::error!(error = %e, "failed to print reloaded routes");
                }
            })
            .with_context(|| format!("failed to watch {}", table.display()))?;
            loop {
                std::thread::park();
            }
        }
    }
    Ok(())
}
