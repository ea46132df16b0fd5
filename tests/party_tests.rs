use brrtmux::router::Router;
use brrtmux::RouteError;
use http::Method;

mod common;
use common::routers::get_handlers;

#[test]
fn test_party_prefix_and_middleware() {
    let mut router = Router::new();
    {
        let mut api = router.party("/api/v1", vec!["cors"]);
        api.get("/users", vec!["list_users"]).unwrap();
        api.post("/users", vec!["create_user"]).unwrap();
        assert_eq!(api.relative_path(), "/api/v1");
    }

    assert_eq!(
        get_handlers(&router, "/api/v1/users"),
        Some(vec!["cors", "list_users"])
    );
    let m = router.lookup(&Method::POST, "", "/api/v1/users").unwrap();
    assert_eq!(m.handlers(), &["cors", "create_user"]);
    assert_eq!(get_handlers(&router, "/users"), None);
}

#[test]
fn test_nested_parties_inherit() {
    let mut router = Router::new();
    {
        let mut users = router.party("/users", vec!["auth"]);
        users.done(vec!["audit"]);
        let mut user = users.party("/{id:int}", vec!["load_user"]);
        user.get("/", vec!["show"]).unwrap();
        user.get("/posts/{slug}", vec!["post"]).unwrap();
    }

    assert_eq!(
        get_handlers(&router, "/users/3"),
        Some(vec!["auth", "load_user", "show", "audit"])
    );
    let m = router.lookup(&Method::GET, "", "/users/3/posts/hi").unwrap();
    assert_eq!(m.handlers(), &["auth", "load_user", "post", "audit"]);
    assert_eq!(m.param_values(), vec!["3", "hi"]);
}

#[test]
fn test_handlers_added_later_apply_to_later_routes() {
    let mut router = Router::new();
    {
        let mut party = router.party("/p", Vec::new());
        party.get("/before", vec!["before"]).unwrap();
        party.use_handlers(vec!["mw"]);
        party.get("/after", vec!["after"]).unwrap();
    }
    assert_eq!(get_handlers(&router, "/p/before"), Some(vec!["before"]));
    assert_eq!(get_handlers(&router, "/p/after"), Some(vec!["mw", "after"]));
}

#[test]
fn test_party_fn_propagates_errors() {
    let mut router: Router<&str> = Router::new();
    let mut admin = router.party("/admin", vec!["auth"]);
    let err = admin
        .party_fn("/settings", |settings| {
            settings.get("/", vec!["show"])?;
            settings.get("/", vec!["again"])?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_duplicate());

    let err = admin.get("/empty", Vec::new()).unwrap_err();
    assert_eq!(
        err,
        RouteError::EmptyHandlers {
            path: "/admin/empty".into()
        }
    );
}

#[test]
fn test_subdomain_parties() {
    let mut router = Router::new();
    router.get("/", vec!["www"]).unwrap();
    {
        let mut admin = router.subdomain("admin", vec!["admin_auth"]);
        assert_eq!(admin.relative_path(), "admin.");
        admin.get("/", vec!["dashboard"]).unwrap();
        admin.get("/users/{id:int}", vec!["admin_user"]).unwrap();
    }
    {
        let mut any = router.subdomain("*", Vec::new());
        any.get("/", vec!["tenant_home"]).unwrap();
    }
    router.config_mut().vhost = "example.com".into();

    let handlers = |host: &str, path: &str| {
        router
            .lookup(&Method::GET, host, path)
            .map(|m| m.handlers().to_vec())
    };
    assert_eq!(handlers("admin.example.com", "/"), Some(vec!["admin_auth", "dashboard"]));
    assert_eq!(
        handlers("admin.example.com", "/users/1"),
        Some(vec!["admin_auth", "admin_user"])
    );
    assert_eq!(handlers("acme.example.com", "/"), Some(vec!["tenant_home"]));
    assert_eq!(handlers("example.com", "/"), Some(vec!["www"]));
    assert_eq!(handlers("example.com", "/users/1"), None);

    let route = router.route("GETadmin./users/:id").unwrap();
    assert_eq!(route.subdomain, "admin.");
    assert_eq!(route.path, "/users/:id");
}

#[test]
fn test_party_any_and_none() {
    let mut router = Router::new();
    {
        let mut files = router.party("/files", vec!["mw"]);
        let routes = files.any("/{p:path}", vec!["serve"]).unwrap();
        assert_eq!(routes.len(), brrtmux::router::ALL_METHODS.len());
        files.none("/legacy/{id}", vec!["legacy"]).unwrap().name = "legacy".into();
    }

    let m = router.lookup(&Method::DELETE, "", "/files/a/b").unwrap();
    assert_eq!(m.handlers(), &["mw", "serve"]);
    assert_eq!(m.get_path_param("p"), Some("a/b"));

    let legacy = router.route("legacy").unwrap();
    assert!(!legacy.is_online());
    assert_eq!(legacy.resolve_path(&["9"]).as_deref(), Some("/files/legacy/9"));
}
