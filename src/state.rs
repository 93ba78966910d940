use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::database::registration_repo;
use crate::services::payment_service::PaymentGateway;
use crate::services::storage_service::StorageBackend;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub gateway: PaymentGateway,
    pub storage: StorageBackend,
}

impl AppState {
    pub async fn new(config: Config) -> Self {
        let pool = SqlitePoolOptions::new()
            .connect(&config.database_url)
            .await
            .expect("Cannot connect to the registration database");
        registration_repo::init_schema(&pool)
            .await
            .expect("Cannot apply the registrations schema");

        let gateway = PaymentGateway::new(&config);
        let storage = StorageBackend::from_config(&config)
            .expect("Cloud storage selected but CLOUD_STORAGE_URL/CLOUD_STORAGE_KEY missing");

        AppState {
            pool,
            config: Arc::new(config),
            gateway,
            storage,
        }
    }
}
