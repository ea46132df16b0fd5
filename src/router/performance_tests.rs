// Performance-focused tests for router scalability
//
// These tests validate that lookups stay proportional to the path length
// rather than the number of registered routes.

use super::Router;
use http::Method;
use std::time::Instant;

fn router_with(count: usize) -> Router<String> {
    let mut router = Router::new();
    for i in 0..count {
        router
            .get(
                &format!("/api/v1/resource{i}/{{id:int}}"),
                vec![format!("handler_{i}")],
            )
            .unwrap();
    }
    router
}

#[test]
fn test_router_performance_with_many_routes() {
    let router = router_with(500);

    let start = Instant::now();
    for _ in 0..1000 {
        let result = router.lookup(&Method::GET, "", "/api/v1/resource250/123");
        assert!(result.is_some());
    }
    let duration = start.elapsed();

    assert!(
        duration.as_millis() < 100,
        "1000 lookups over 500 routes took {}ms",
        duration.as_millis()
    );
}

#[test]
fn test_router_performance_scales_with_path_not_routes() {
    let small = router_with(10);
    let large = router_with(1000);

    let time = |router: &Router<String>, path: &str| {
        let start = Instant::now();
        for _ in 0..1000 {
            assert!(router.lookup(&Method::GET, "", path).is_some());
        }
        start.elapsed()
    };

    let small_time = time(&small, "/api/v1/resource5/1");
    let large_time = time(&large, "/api/v1/resource500/1");

    // generous bound: a linear scan over 100x more routes would blow past it
    assert!(
        large_time.as_nanos() < small_time.as_nanos().max(1) * 20 + 5_000_000,
        "small={small_time:?} large={large_time:?}"
    );
}

#[test]
fn test_deep_parameter_paths() {
    let mut router = Router::new();
    router
        .get("/a/{p1}/b/{p2}/c/{p3}/d/{p4}/e/{p5}/f/{p6}/g/{p7}/h/{p8}/i/{p9}", vec!["deep"])
        .unwrap();

    let m = router
        .lookup(&Method::GET, "", "/a/1/b/2/c/3/d/4/e/5/f/6/g/7/h/8/i/9")
        .unwrap();
    assert_eq!(m.path_params.len(), 9);
    // more than the inline capacity spills to the heap
    assert!(m.path_params.spilled());
    assert_eq!(m.get_path_param("p9"), Some("9"));
}
