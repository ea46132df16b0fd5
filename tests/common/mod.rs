#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write `content` to `name` inside a fresh temporary directory.
    ///
    /// The directory is removed when the returned guard drops.
    pub fn create_temp_table(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    pub fn create_temp_yaml(content: &str) -> (TempDir, PathBuf) {
        create_temp_table("routes.yaml", content)
    }
}

pub mod routers {
    use brrtmux::router::Router;
    use http::Method;

    /// Handler chain for a GET request, if any route accepts it.
    pub fn get_handlers(router: &Router<&'static str>, path: &str) -> Option<Vec<&'static str>> {
        router
            .lookup(&Method::GET, "", path)
            .map(|m| m.handlers().to_vec())
    }
}
