//! axum middleware tests

use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
};
use pathguard::access_control::{AuthorizationContext, AuthorizationEvaluator, Identity};
use pathguard::middleware::authorize;
use std::sync::Arc;
use tower::ServiceExt;

fn evaluator() -> Arc<AuthorizationEvaluator> {
    Arc::new(
        AuthorizationEvaluator::builder()
            .path("/public/**")
            .permit_all()
            .path("/admin/**")
            .has_role("ADMIN")
            .path("/users/{user}/**")
            .path_variable_matches_name("user")
            .any_request()
            .authenticated()
            .build()
            .unwrap(),
    )
}

async fn whoami(Extension(context): Extension<AuthorizationContext>) -> String {
    context.variable("user").unwrap_or("-").to_string()
}

fn routes() -> Router {
    Router::new()
        .route("/public/info", get(|| async { "public" }))
        .route("/admin/panel", get(|| async { "admin" }))
        .route("/users/{user}/profile", get(whoami))
        .route("/home", get(|| async { "home" }))
        .layer(middleware::from_fn_with_state(evaluator(), authorize))
}

/// Router as seen by an authenticated principal
fn app_as(identity: Identity) -> Router {
    routes().layer(Extension(identity))
}

async fn status(app: Router, path: &str) -> StatusCode {
    app.oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_anonymous_public_allowed() {
    assert_eq!(status(routes(), "/public/info").await, StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_gets_unauthorized() {
    assert_eq!(status(routes(), "/home").await, StatusCode::UNAUTHORIZED);
    assert_eq!(status(routes(), "/admin/panel").await, StatusCode::UNAUTHORIZED);
    assert_eq!(
        status(routes(), "/users/alice/profile").await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_admin_allowed() {
    let root = Identity::new("root").with_role("ADMIN");
    assert_eq!(status(app_as(root), "/admin/panel").await, StatusCode::OK);
}

#[tokio::test]
async fn test_non_admin_forbidden() {
    let alice = Identity::new("alice");
    assert_eq!(
        status(app_as(alice), "/admin/panel").await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_user_subtree() {
    let alice = Identity::new("alice");
    assert_eq!(
        status(app_as(alice.clone()), "/users/alice/profile").await,
        StatusCode::OK
    );
    assert_eq!(
        status(app_as(alice), "/users/bob/profile").await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_context_reaches_handler() {
    let alice = Identity::new("alice");
    let response = app_as(alice)
        .oneshot(
            Request::builder()
                .uri("/users/alice/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    assert_eq!(&body[..], b"alice");
}

#[tokio::test]
async fn test_unrouted_path_is_authorized_before_routing() {
    // Denied before the router can answer 404
    assert_eq!(status(routes(), "/missing").await, StatusCode::UNAUTHORIZED);

    let alice = Identity::new("alice");
    assert_eq!(
        status(app_as(alice), "/missing").await,
        StatusCode::NOT_FOUND
    );
}
