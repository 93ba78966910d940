use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use sahityotsava::config::Config;
use sahityotsava::state::AppState;
use sahityotsava::web::middleware::auth as auth_middleware;
use sahityotsava::web::routes::{admin, orders, pages, register};

// Multipart bodies above this are cut off by axum before the handler runs;
// the 5MB screenshot cap itself is enforced per-file in the handler.
const MAX_MULTIPART_BODY_BYTES: usize = 8 * 1024 * 1024;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Connect to the database and build the shared state
    let config = Config::load();
    let host = config.host.clone();
    let port = config.port;
    let upload_dir = config.upload_dir.clone();
    let state = AppState::new(config).await;

    // 3. Admin routes behind one auth layer
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard_handler))
        .route("/api/registrations", get(admin::list_registrations_handler))
        .route(
            "/api/admin/verify/:id",
            post(admin::verify_registration_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_admin,
        ));

    // 4. Build the whole application
    let app = Router::new()
        // Public pages and API
        .route("/", get(pages::index_handler))
        .route("/success", get(pages::success_handler))
        .route("/api/create-order", post(orders::create_order_handler))
        .route("/api/verify-payment", post(orders::verify_payment_handler))
        .route(
            "/api/register",
            post(register::register_handler)
                .layer(DefaultBodyLimit::max(MAX_MULTIPART_BODY_BYTES)),
        )
        // Admin login/logout stay outside the auth layer
        .route(
            "/admin/login",
            get(admin::login_page).post(admin::login_handler),
        )
        .route("/admin/logout", post(admin::logout_handler))
        // Protected routes
        .merge(admin_routes)
        // Static files and locally stored screenshots
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        .nest_service("/uploads", get_service(ServeDir::new(upload_dir)))
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(state);

    // 5. Start the server (with fallback port)
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Server running on http://{}", bound_addr);
    println!("📊 Admin dashboard: http://{}/admin/dashboard", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
