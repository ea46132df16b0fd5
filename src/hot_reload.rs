//! # Hot Reload Module
//!
//! Watches a route table file and swaps in a freshly built router whenever
//! the file changes. Lookups in flight keep the snapshot they loaded.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arc_swap::ArcSwap;
//! use brrtmux::hot_reload::watch_table;
//! use brrtmux::macros::MacroMap;
//! use brrtmux::table::load_table;
//! use std::sync::Arc;
//!
//! let router = load_table("routes.yaml")?.build_router(&MacroMap::default())?;
//! let live = Arc::new(ArcSwap::from_pointee(router));
//!
//! let _watcher = watch_table("routes.yaml", Arc::clone(&live), |router| {
//!     println!("Reloaded {} routes", router.routes().len());
//! })?;
//!
//! // request threads call `live.load()` per request
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! A table that fails to load or build is logged and ignored: the previous
//! router stays active until a valid table is saved.

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::router::Router;
use crate::table::load_table;

/// Load the table at `path` and build it with the macros of `current`.
///
/// # Errors
///
/// Load, parse and registration errors.
pub fn reload_table(path: &Path, current: &Router<String>) -> anyhow::Result<Router<String>> {
    let table = load_table(path)?;
    let router = table.build_router(current.macros())?;
    Ok(router)
}

/// Watch a route table and rebuild `router` when it changes.
///
/// The new router is built with the macro set of the one it replaces, so
/// custom functions survive reloads. `on_reload` runs after every swap.
/// Keep the returned watcher alive for as long as reloads are wanted.
pub fn watch_table<P, F>(
    table_path: P,
    router: Arc<ArcSwap<Router<String>>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&Router<String>) + Send + 'static,
{
    let path: PathBuf = table_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let current = router.load();
                match reload_table(&watch_path, &current) {
                    Ok(next) => {
                        let next = Arc::new(next);
                        router.store(Arc::clone(&next));
                        info!(
                            path = %watch_path.display(),
                            routes_count = next.routes().len(),
                            "hot-reload: route table applied"
                        );
                        on_reload(&next);
                    }
                    Err(e) => {
                        warn!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: invalid route table, keeping previous routes"
                        );
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
