use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use sahityotsava::config::{Config, StorageKind};
use sahityotsava::database::registration_repo;
use sahityotsava::services::payment_service::PaymentGateway;
use sahityotsava::services::storage_service::StorageBackend;
use sahityotsava::state::AppState;
use sahityotsava::web::middleware::auth as auth_middleware;
use sahityotsava::web::routes::{admin, register};

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config(upload_dir: &str) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        razorpay_key_id: "rzp_test_key".to_string(),
        razorpay_key_secret: "test_secret".to_string(),
        razorpay_base_url: "https://api.razorpay.com".to_string(),
        storage: StorageKind::LocalDisk,
        upload_dir: upload_dir.to_string(),
        cloud_storage_url: None,
        cloud_storage_key: None,
        admin_user: "admin".to_string(),
        admin_token: ADMIN_TOKEN.to_string(),
    }
}

async fn test_state(upload_dir: &str) -> AppState {
    // Every pooled connection to :memory: would get its own database, so pin
    // the pool to one connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    registration_repo::init_schema(&pool).await.expect("schema");

    let config = test_config(upload_dir);
    let gateway = PaymentGateway::new(&config);
    let storage = StorageBackend::LocalDisk {
        dir: upload_dir.into(),
    };
    AppState {
        pool,
        config: Arc::new(config),
        gateway,
        storage,
    }
}

fn register_app(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(register::register_handler))
        .with_state(state)
}

const BOUNDARY: &str = "registration-test-boundary";

fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"paymentScreenshot\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn register_request(content_type: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/register")
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap()
}

fn form_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Amina"),
        ("age", "21"),
        ("unit", "Adhur"),
        ("sector", "Kasaragod East"),
        ("phoneNumber", "9876543210"),
    ]
}

fn temp_upload_dir() -> String {
    std::env::temp_dir()
        .join(format!("screenshots-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned()
}

#[tokio::test]
async fn upload_without_a_screenshot_is_rejected() {
    let app = register_app(test_state(&temp_upload_dir()).await);

    let (content_type, body) = multipart_body(&form_fields(), None);
    let response = app
        .oneshot(register_request(&content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        payload["error"],
        serde_json::json!("Payment screenshot is required")
    );
}

#[tokio::test]
async fn upload_with_a_non_image_file_is_rejected() {
    let app = register_app(test_state(&temp_upload_dir()).await);

    let (content_type, body) = multipart_body(
        &form_fields(),
        Some(("receipt.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let response = app
        .oneshot(register_request(&content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_with_missing_fields_is_rejected() {
    let app = register_app(test_state(&temp_upload_dir()).await);

    let (content_type, body) = multipart_body(
        &[("name", "Amina")],
        Some(("shot.png", "image/png", b"not-really-a-png")),
    );
    let response = app
        .oneshot(register_request(&content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_when_the_store_is_down_is_service_unavailable() {
    let state = test_state(&temp_upload_dir()).await;
    state.pool.close().await;
    let app = register_app(state);

    let (content_type, body) = multipart_body(
        &form_fields(),
        Some(("shot.png", "image/png", b"not-really-a-png")),
    );
    let response = app
        .oneshot(register_request(&content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn valid_upload_lands_as_a_pending_registration() {
    let upload_dir = temp_upload_dir();
    let state = test_state(&upload_dir).await;
    let pool = state.pool.clone();
    let app = register_app(state);

    let mut fields = form_fields();
    fields.push(("transactionId", "TXN42"));
    let (content_type, body) = multipart_body(
        &fields,
        Some(("shot.png", "image/png", b"not-really-a-png")),
    );
    let response = app
        .oneshot(register_request(&content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["success"], serde_json::json!(true));
    let id = payload["registrationId"].as_str().expect("id");

    let row = registration_repo::find_registration(&pool, id)
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(row.payment_status, "pending");
    assert_eq!(row.transaction_id.as_deref(), Some("TXN42"));
    assert!(row
        .screenshot_ref
        .as_deref()
        .is_some_and(|r| r.starts_with("/uploads/")));

    tokio::fs::remove_dir_all(&upload_dir).await.ok();
}

fn admin_app(state: AppState) -> Router {
    Router::new()
        .route("/api/registrations", get(admin::list_registrations_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_admin,
        ))
        .with_state(state)
}

fn list_request() -> axum::http::request::Builder {
    Request::builder().method("GET").uri("/api/registrations")
}

#[tokio::test]
async fn admin_api_without_credentials_is_unauthorized() {
    let app = admin_app(test_state(&temp_upload_dir()).await);
    let response = app
        .oneshot(list_request().body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_api_accepts_the_token_header() {
    let app = admin_app(test_state(&temp_upload_dir()).await);
    let response = app
        .oneshot(
            list_request()
                .header("x-admin-token", ADMIN_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_api_accepts_the_session_cookie() {
    let app = admin_app(test_state(&temp_upload_dir()).await);
    let cookie = format!(
        "{}={}",
        auth_middleware::ADMIN_SESSION_COOKIE,
        ADMIN_TOKEN
    );
    let response = app
        .oneshot(list_request().header("cookie", cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let wrong = format!("{}=wrong", auth_middleware::ADMIN_SESSION_COOKIE);
    let app = admin_app(test_state(&temp_upload_dir()).await);
    let response = app
        .oneshot(list_request().header("cookie", wrong).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
