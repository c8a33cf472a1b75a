//! axum middleware
//!
//! Puts an [`AuthorizationEvaluator`] in front of a router. The host's
//! authentication layer is expected to insert the caller's [`Identity`] into
//! the request extensions; a request without one is anonymous.
//!
//! ```no_run
//! use axum::{Router, middleware, routing::get};
//! use pathguard::access_control::AuthorizationEvaluator;
//! use pathguard::middleware::authorize;
//! use std::sync::Arc;
//!
//! let evaluator = Arc::new(
//!     AuthorizationEvaluator::builder()
//!         .path("/admin/**").has_role("ADMIN")
//!         .any_request().authenticated()
//!         .build()
//!         .unwrap(),
//! );
//!
//! let app: Router = Router::new()
//!     .route("/admin/panel", get(|| async { "admin" }))
//!     .layer(middleware::from_fn_with_state(evaluator, authorize));
//! ```

use crate::access_control::{AuthorizationEvaluator, Identity};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Authorize a request before handing it to the inner service
///
/// On success the matched `AuthorizationContext` is added to the request
/// extensions. Denied anonymous requests get `401`, denied principals `403`.
pub async fn authorize(
    State(evaluator): State<Arc<AuthorizationEvaluator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = request.extensions().get::<Identity>().cloned();
    let path = request.uri().path().to_string();

    let evaluation = evaluator.authorize(identity.as_ref(), &path);

    if let Some(reason) = evaluation.decision.reason() {
        debug!(
            path = %path,
            principal = identity.as_ref().map(Identity::name),
            reason,
            "Request denied"
        );
        let status = if identity.is_some() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::UNAUTHORIZED
        };
        return status.into_response();
    }

    request.extensions_mut().insert(evaluation.context);
    next.run(request).await
}
