use brrtmux::router::{RoutePathReverser, Router};
use brrtmux::RouterConfig;
use http::Method;

fn named(router: &mut Router<&'static str>, path: &str, name: &str) {
    router.get(path, vec!["h"]).unwrap().name = name.to_string();
}

fn router() -> Router<&'static str> {
    let mut router = Router::new();
    named(&mut router, "/", "home");
    named(&mut router, "/users/{id:int}", "user");
    named(&mut router, "/users/{id:int}/posts/{slug}", "post");
    named(&mut router, "/assets/{file:path}", "asset");
    named(&mut router, "*./profile/{id}", "profile");
    named(&mut router, "api./v1/status", "status");
    router
        .none("/invite/{code:alphabetical}", vec!["invite"])
        .unwrap()
        .name = "invite".into();
    router.build();
    router
}

#[test]
fn test_path_substitutes_in_order() {
    let router = router();
    let reverser = RoutePathReverser::new(&router);

    assert_eq!(reverser.path("home", &[]).as_deref(), Some("/"));
    assert_eq!(reverser.path("user", &["42"]).as_deref(), Some("/users/42"));
    assert_eq!(
        reverser.path("post", &["42", "hello-world"]).as_deref(),
        Some("/users/42/posts/hello-world")
    );
}

#[test]
fn test_path_joins_wildcard_tail() {
    let router = router();
    let reverser = RoutePathReverser::new(&router);
    assert_eq!(
        reverser.path("asset", &["css", "site", "main.css"]).as_deref(),
        Some("/assets/css/site/main.css")
    );
    assert_eq!(
        reverser.path("asset", &["logo.png"]).as_deref(),
        Some("/assets/logo.png")
    );
}

#[test]
fn test_wrong_value_count_or_name() {
    let router = router();
    let reverser = RoutePathReverser::new(&router);
    assert_eq!(reverser.path("user", &[]), None);
    assert_eq!(reverser.path("user", &["1", "2"]), None);
    assert_eq!(reverser.path("asset", &[]), None);
    assert_eq!(reverser.path("nope", &[]), None);
}

#[test]
fn test_reversed_path_matches_back() {
    let router = router();
    let reverser = RoutePathReverser::new(&router);
    let path = reverser.path("post", &["7", "intro"]).unwrap();
    let m = router.lookup(&Method::GET, "", &path).unwrap();
    assert_eq!(m.route.name, "post");
    assert_eq!(m.param_values(), vec!["7", "intro"]);
}

#[test]
fn test_offline_routes_are_reversible() {
    let router = router();
    let reverser = RoutePathReverser::new(&router);
    assert_eq!(reverser.path("invite", &["abc"]).as_deref(), Some("/invite/abc"));
    assert!(router.lookup(&Method::GET, "", "/invite/abc").is_none());
}

#[test]
fn test_url_scheme_from_host() {
    let router = router();

    let secure = RoutePathReverser::new(&router).with_host("example.com:443");
    assert_eq!(
        secure.url("user", &["1"]).as_deref(),
        Some("https://example.com/users/1")
    );

    let plain = RoutePathReverser::new(&router).with_host("example.com");
    assert_eq!(plain.url("user", &["1"]).as_deref(), Some("http://example.com/users/1"));

    let forced = RoutePathReverser::new(&router)
        .with_scheme("https")
        .with_host("example.com:8443");
    assert_eq!(
        forced.url("home", &[]).as_deref(),
        Some("https://example.com:8443/")
    );
}

#[test]
fn test_url_subdomains() {
    let router = router();
    let reverser = RoutePathReverser::new(&router).with_host("example.com");

    assert_eq!(
        reverser.url("profile", &["alice", "9"]).as_deref(),
        Some("http://alice.example.com/profile/9")
    );
    assert_eq!(
        reverser.url("status", &[]).as_deref(),
        Some("http://api.example.com/v1/status")
    );
    // the label is consumed before the path values
    assert_eq!(reverser.url("profile", &["alice"]), None);
}

#[test]
fn test_url_host_from_config() {
    let mut router = Router::with_config(RouterConfig {
        vhost: "https://example.org".into(),
        ..RouterConfig::default()
    });
    named(&mut router, "/about", "about");

    let reverser = RoutePathReverser::new(&router);
    assert_eq!(
        reverser.url("about", &[]).as_deref(),
        Some("https://example.org/about")
    );

    let no_host: Router<&str> = Router::new();
    assert_eq!(RoutePathReverser::new(&no_host).url("about", &[]), None);
}
