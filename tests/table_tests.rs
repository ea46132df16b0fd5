use arc_swap::ArcSwap;
use brrtmux::hot_reload::{reload_table, watch_table};
use brrtmux::macros::MacroMap;
use brrtmux::router::RoutePathReverser;
use brrtmux::{load_table, Resolution};
use http::{Method, Request};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::temp_files::{create_temp_table, create_temp_yaml};

const YAML_TABLE: &str = r"
vhost: example.com
router:
  fire_method_not_allowed: true
begin: [request_id]
done: [access_log]
routes:
  - method: GET
    path: /users/{id:int min(1)}
    handlers: [auth, get_user]
    name: user
  - method: post
    path: /users
    handler: create_user
  - method: ANY
    path: /static/{file:path}
    handler: serve_static
    name: static
  - method: NONE
    path: /invite/{code}
    handler: invite
    name: invite
  - method: GET
    path: admin./
    handler: dashboard
";

#[test]
fn test_load_yaml_table() {
    let (_dir, path) = create_temp_yaml(YAML_TABLE);
    let table = load_table(&path).unwrap();
    assert_eq!(table.routes.len(), 5);
    assert_eq!(table.config().vhost, "example.com");
    assert!(table.config().fire_method_not_allowed);

    let router = table.build_router(&MacroMap::default()).unwrap();
    let m = router.lookup(&Method::GET, "example.com", "/users/5").unwrap();
    assert_eq!(m.handlers(), &["request_id", "auth", "get_user", "access_log"]);

    let m = router.lookup(&Method::PATCH, "", "/static/css/app.css").unwrap();
    assert_eq!(m.handlers(), &["request_id", "serve_static", "access_log"]);
    assert_eq!(m.route.name, "PATCH/static/*file");

    assert!(router.route("static").is_some());
    assert!(router.lookup(&Method::GET, "", "/invite/xyz").is_none());

    let reverser = RoutePathReverser::new(&router);
    assert_eq!(reverser.path("invite", &["xyz"]).as_deref(), Some("/invite/xyz"));
    assert_eq!(
        reverser.url("user", &["5"]).as_deref(),
        Some("http://example.com/users/5")
    );

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/users")
        .body(())
        .unwrap();
    assert!(matches!(
        router.serve(&req),
        Resolution::MethodNotAllowed { ref allowed, .. } if allowed == &vec![Method::POST]
    ));
}

#[test]
fn test_load_toml_and_json_tables() {
    let (_toml_dir, toml_path) = create_temp_table(
        "routes.toml",
        r#"
[router]
vhost = "api.local"

[[routes]]
method = "GET"
path = "/health"
handler = "health"
name = "health"
"#,
    );
    let router = load_table(&toml_path)
        .unwrap()
        .build_router(&MacroMap::default())
        .unwrap();
    assert_eq!(router.config().vhost, "api.local");
    assert!(router.lookup(&Method::GET, "", "/health").is_some());

    let (_json_dir, json_path) = create_temp_table(
        "routes.json",
        r#"{"routes": [{"method": "PUT", "path": "/items/{id}", "handlers": ["put_item"]}]}"#,
    );
    let router = load_table(&json_path)
        .unwrap()
        .build_router(&MacroMap::default())
        .unwrap();
    let m = router.lookup(&Method::PUT, "", "/items/a1").unwrap();
    assert_eq!(m.get_path_param("id"), Some("a1"));
}

#[test]
fn test_load_errors() {
    let (_dir, txt) = create_temp_table("routes.txt", "routes: []");
    let err = load_table(&txt).unwrap_err();
    assert!(err.to_string().contains("unsupported route table extension"));

    let (_dir, bad_method) = create_temp_yaml("routes:\n  - method: \"GE T\"\n    path: /\n    handler: h\n");
    assert!(load_table(&bad_method).is_err());

    let (_dir, broken) = create_temp_table("routes.json", "{ not json");
    assert!(load_table(&broken).is_err());

    assert!(load_table("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_custom_macros_apply_to_tables() {
    let mut macros = MacroMap::default();
    macros
        .macro_mut(brrtmux::ParamType::String)
        .register_func("sku", |args| {
            args.expect_len(0)?;
            Ok(Arc::new(|v: &str| v.starts_with("SKU-")))
        });

    let (_dir, path) = create_temp_yaml(
        "routes:\n  - method: GET\n    path: /sku/{id:string sku() else 422}\n    handler: sku\n",
    );
    let router = load_table(&path).unwrap().build_router(&macros).unwrap();
    assert!(router.lookup(&Method::GET, "", "/sku/SKU-1").is_some());
    assert_eq!(router.resolve(&Method::GET, "", "/sku/X-1").unwrap_err(), 422);

    // unknown function without the custom macro set
    assert!(load_table(&path)
        .unwrap()
        .build_router(&MacroMap::default())
        .is_err());
}

#[test]
fn test_reload_table_keeps_macros() {
    let mut macros = MacroMap::default();
    macros
        .macro_mut(brrtmux::ParamType::Int)
        .register_func("odd", |args| {
            args.expect_len(0)?;
            Ok(Arc::new(|v: &str| v.parse::<i64>().is_ok_and(|n| n % 2 != 0)))
        });
    let (_dir, path) = create_temp_yaml(
        "routes:\n  - method: GET\n    path: /n/{n:int odd()}\n    handler: n\n",
    );
    let first = load_table(&path).unwrap().build_router(&macros).unwrap();
    let second = reload_table(&path, &first).unwrap();
    assert!(second.lookup(&Method::GET, "", "/n/3").is_some());
    assert!(second.lookup(&Method::GET, "", "/n/4").is_none());
}

#[test]
fn test_reload_table_rejects_invalid_table() {
    let (_dir, path) = create_temp_yaml("routes:\n  - method: GET\n    path: /foo\n    handler: foo\n");
    let current = load_table(&path)
        .unwrap()
        .build_router(&MacroMap::default())
        .unwrap();

    std::fs::write(
        &path,
        "routes:\n  - method: GET\n    path: /foo/{id:nosuchtype}\n    handler: x\n",
    )
    .unwrap();
    let err = reload_table(&path, &current).unwrap_err();
    assert!(format!("{err:#}").contains("nosuchtype"));
    assert!(current.lookup(&Method::GET, "", "/foo").is_some());
}

#[test]
fn test_watch_table_reload() {
    const TABLE_V1: &str = "routes:\n  - method: GET\n    path: /foo\n    handler: foo_one\n";
    const TABLE_V2: &str = "routes:\n  - method: GET\n    path: /foo\n    handler: foo_two\n";

    let (_dir, path) = create_temp_yaml(TABLE_V1);
    let router = load_table(&path)
        .unwrap()
        .build_router(&MacroMap::default())
        .unwrap();
    let live = Arc::new(ArcSwap::from_pointee(router));

    let updates: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);

    let watcher = watch_table(&path, Arc::clone(&live), move |router| {
        let handlers = router
            .routes()
            .iter()
            .flat_map(|r| r.handlers().to_vec())
            .collect();
        updates_clone.lock().unwrap().push(handlers);
    })
    .expect("watch_table");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(&path, TABLE_V2).unwrap();

    for _ in 0..40 {
        {
            let ups = updates.lock().unwrap();
            if ups.iter().any(|v| v.contains(&"foo_two".to_string())) {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    {
        let ups = updates.lock().unwrap();
        assert!(ups.iter().any(|v| v.contains(&"foo_two".to_string())));
    }
    let current = live.load();
    let m = current.lookup(&Method::GET, "", "/foo").unwrap();
    assert_eq!(m.handlers(), &["foo_two".to_string()]);

    drop(watcher);
}
