use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// The admin acting on this request, injected by `require_admin`.
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub name: String,
}

/// Admin gate for the dashboard and the admin API. Accepts the session
/// cookie set by the login form, or an `X-Admin-Token` header for API
/// clients. Browsers get bounced to the login page, API callers get 401.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = state.config.admin_token.as_str();

    let header_ok = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .map(|v| v == token)
        .unwrap_or(false);

    let session_prefix = format!("{}=", ADMIN_SESSION_COOKIE);
    let cookie_ok = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find_map(|c| c.strip_prefix(session_prefix.as_str()))
        })
        .map(|v| v == token)
        .unwrap_or(false);

    if header_ok || cookie_ok {
        request.extensions_mut().insert(AdminUser {
            name: state.config.admin_user.clone(),
        });
        return next.run(request).await;
    }

    if request.uri().path().starts_with("/api/") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response();
    }
    Redirect::to("/admin/login").into_response()
}
