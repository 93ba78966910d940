use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use cookie::Cookie;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::database::registration_repo;
use crate::error::ApiError;
use crate::models::PaymentStatus;
use crate::services::registration_service::{
    self, DashboardRow, DashboardStats, RegistrationView, VerifyError,
};
use crate::state::AppState;
use crate::web::middleware::auth::{AdminUser, ADMIN_SESSION_COOKIE};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub failed: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginQuery {
    pub failed: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let template = LoginTemplate {
        failed: query.failed.is_some(),
    };
    Html(template.render().unwrap())
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub token: String,
}

pub async fn login_handler(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if form.username != state.config.admin_user || form.token != state.config.admin_token {
        warn!("Failed admin login for user {}", form.username);
        return Redirect::to("/admin/login?failed=1").into_response();
    }

    let mut session = Cookie::new(ADMIN_SESSION_COOKIE, state.config.admin_token.clone());
    session.set_path("/");
    session.set_http_only(true);
    session.set_same_site(cookie::SameSite::Lax);

    let mut response = Redirect::to("/admin/dashboard").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, session.to_string().parse().unwrap());
    response
}

pub async fn logout_handler() -> Response {
    let mut session = Cookie::new(ADMIN_SESSION_COOKIE, "");
    session.set_path("/");
    session.set_http_only(true);
    session.set_same_site(cookie::SameSite::Lax);
    session.set_max_age(None);

    let mut response = Redirect::to("/admin/login").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, session.to_string().parse().unwrap());
    response
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin: String,
    pub stats: DashboardStats,
    pub rows: Vec<DashboardRow>,
}

pub async fn dashboard_handler(
    Extension(admin): Extension<AdminUser>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let registrations = match registration_repo::list_registrations(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Dashboard load failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let stats = registration_service::compute_stats(&registrations);
    let rows = registrations.iter().map(DashboardRow::from).collect();

    let template = DashboardTemplate {
        admin: admin.name,
        stats,
        rows,
    };
    Html(template.render().unwrap()).into_response()
}

pub async fn list_registrations_handler(
    Extension(_admin): Extension<AdminUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationView>>, ApiError> {
    let views = registration_service::list_registration_views(&state.pool).await?;
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct VerifyDecision {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "transactionId")]
    pub transaction_id: Option<String>,
}

pub async fn verify_registration_handler(
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(decision): Json<VerifyDecision>,
) -> Result<Json<Value>, ApiError> {
    let status = match decision.status.parse::<PaymentStatus>() {
        Ok(s @ (PaymentStatus::Verified | PaymentStatus::Rejected)) => s,
        _ => {
            return Err(ApiError::BadRequest(
                "Status must be 'verified' or 'rejected'".to_string(),
            ))
        }
    };

    let row = registration_service::verify_registration(
        &state.pool,
        &id,
        status,
        &admin.name,
        decision.transaction_id.as_deref(),
    )
    .await
    .map_err(|e| match e {
        VerifyError::NotFound => ApiError::NotFound,
        VerifyError::AlreadyDecided => {
            ApiError::BadRequest("Registration has already been decided".to_string())
        }
        VerifyError::Db(e) => ApiError::Database(e),
    })?;

    Ok(Json(json!({
        "success": true,
        "registration": RegistrationView::from(row),
    })))
}
