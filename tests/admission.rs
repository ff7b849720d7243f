//! End-to-end admission pipeline tests, driven through the full axum stack.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;

mod common;

use common::{admin_token, gateway, token, MEMBER_EMAIL, MEMBER_ID};

#[tokio::test]
async fn test_unknown_route_is_404() {
    let gw = gateway(10);
    let (status, body) = gw.get("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_static_route_wins_over_param_route() {
    let gw = gateway(10);
    let (status, body) = gw.get("/api/listings/search?q=bike").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "route": "search", "id": null }));

    let (_, body) = gw.get("/api/listings/42").await;
    assert_eq!(body, json!({ "route": "show", "id": "42" }));
}

#[tokio::test]
async fn test_responses_carry_request_id_and_cors_origin() {
    let gw = gateway(10);
    let (_, headers, _) = gw
        .send(Request::get("/api/health").body(Body::empty()).unwrap())
        .await;
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
}

#[tokio::test]
async fn test_preflight_short_circuits_even_in_maintenance() {
    let gw = gateway(10);
    gw.set_maintenance(true, "Down for upgrades").await;

    let (status, headers, body) = gw
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/listings/")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_group_budget_is_shared_across_routes() {
    let gw = gateway(2);

    let (first, _) = gw.get("/api/listings/").await;
    let (second, _) = gw.get("/api/listings/7").await;
    let (third, body) = gw.get("/api/listings/search").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Too Many Requests" }));

    assert_eq!(gw.state.limiter.current_count("LISTINGS").await.unwrap(), 2);
}

#[tokio::test]
async fn test_ungrouped_routes_are_never_limited() {
    let gw = gateway(1);
    for _ in 0..5 {
        let (status, _) = gw.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_maintenance_blocks_api_but_keeps_allowlist_reachable() {
    let gw = gateway(10);
    gw.set_maintenance(true, "Back at noon").await;

    let (status, body) = gw.get("/api/listings/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({ "error": "Service under maintenance", "message": "Back at noon" })
    );

    let (status, body) = gw.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = gw.get("/api/maintenance/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "enabled": true, "message": "Back at noon" }));

    // Reachable past the gate; the handler itself then demands an admin.
    let (status, body) = gw.get("/api/admin/config").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_maintenance_blocks_unknown_paths_before_routing() {
    let gw = gateway(10);
    gw.set_maintenance(true, "Later").await;

    let (status, body) = gw.get("/api/does-not-exist").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service under maintenance");
}

#[tokio::test]
async fn test_maintenance_renders_html_for_pages() {
    let gw = gateway(10);
    gw.set_maintenance(true, "<b>Soon</b>").await;

    let (status, headers, body) = gw
        .send(Request::get("/about").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("&lt;b&gt;Soon&lt;/b&gt;"));
    assert!(!html.contains("<b>Soon</b>"));
}

#[tokio::test]
async fn test_verified_admin_bypasses_maintenance() {
    let gw = gateway(10);
    gw.set_maintenance(true, "Closed").await;

    let admin = admin_token();
    let (status, body) = gw.request("GET", "/api/listings/9", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "show");
}

#[tokio::test]
async fn test_non_admin_and_expired_tokens_stay_blocked() {
    let gw = gateway(10);
    gw.set_maintenance(true, "Closed").await;

    let member = token(MEMBER_ID, MEMBER_EMAIL, 1);
    let (status, _) = gw.request("GET", "/api/listings/", Some(&member), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let expired = token(common::ADMIN_ID, common::ADMIN_EMAIL, -1);
    let (status, _) = gw.request("GET", "/api/listings/", Some(&expired), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Admin id with someone else's email.
    let mismatched = token(common::ADMIN_ID, MEMBER_EMAIL, 1);
    let (status, _) = gw.request("GET", "/api/listings/", Some(&mismatched), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_admin_config_toggles_maintenance() {
    let gw = gateway(10);
    let admin = admin_token();

    let (status, body) = gw
        .request(
            "PUT",
            "/api/admin/config",
            Some(&admin),
            Some(json!({ "enabled": true, "message": "Migrating data" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maintenance"]["enabled"], true);

    let (status, body) = gw.get("/api/listings/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Migrating data");

    let (status, _) = gw
        .request(
            "PUT",
            "/api/admin/config",
            Some(&admin),
            Some(json!({ "enabled": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = gw.get("/api/listings/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_config_rejects_members() {
    let gw = gateway(10);
    let member = token(MEMBER_ID, MEMBER_EMAIL, 1);

    let (status, body) = gw
        .request(
            "PUT",
            "/api/admin/config",
            Some(&member),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (_, body) = gw.get("/api/maintenance/status").await;
    assert_eq!(body["enabled"], false);
}

#[tokio::test]
async fn test_admin_rate_limit_view() {
    let gw = gateway(5);
    gw.get("/api/listings/").await;
    gw.get("/api/listings/3").await;

    let admin = admin_token();
    let (status, body) = gw
        .request("GET", "/api/admin/rate-limits/listings", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "group": "LISTINGS",
            "max": 5,
            "window_ms": 3_600_000,
            "unlimited": false,
            "current": 2,
        })
    );
}

#[tokio::test]
async fn test_static_assets_bypass_maintenance() {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(public.join("uploads")).unwrap();
    std::fs::write(public.join("uploads/photo.txt"), "pixels").unwrap();

    let mut config = common::test_config(&dir, 10);
    config.static_files.enabled = true;
    config.static_files.root = public.to_string_lossy().to_string();
    let gw = common::gateway_with(dir, config);
    gw.set_maintenance(true, "Closed").await;

    let (status, _, body) = gw
        .send(Request::get("/uploads/photo.txt").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pixels");
}
