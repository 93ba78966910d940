use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Which backend stores uploaded payment screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    LocalDisk,
    CloudObject,
}

/// Everything the server reads from the environment, collected once at
/// startup and handed to the handlers through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    pub storage: StorageKind,
    pub upload_dir: String,
    pub cloud_storage_url: Option<String>,
    pub cloud_storage_key: Option<String>,
    pub admin_user: String,
    pub admin_token: String,
}

impl Config {
    pub fn load() -> Self {
        let storage = match var("STORAGE_BACKEND").as_deref() {
            Ok("cloud") => StorageKind::CloudObject,
            _ => StorageKind::LocalDisk,
        };

        Self {
            database_url: required("DATABASE_URL"),
            host: try_load("HOST", "127.0.0.1"),
            port: try_load("PORT", "3000"),
            razorpay_key_id: required("RAZORPAY_KEY_ID"),
            razorpay_key_secret: required("RAZORPAY_KEY_SECRET"),
            razorpay_base_url: try_load("RAZORPAY_BASE_URL", "https://api.razorpay.com"),
            storage,
            upload_dir: try_load("UPLOAD_DIR", "uploads"),
            cloud_storage_url: var("CLOUD_STORAGE_URL").ok(),
            cloud_storage_key: var("CLOUD_STORAGE_KEY").ok(),
            admin_user: try_load("ADMIN_USER", "admin"),
            admin_token: required("ADMIN_TOKEN"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn required(key: &str) -> String {
    var(key).unwrap_or_else(|_| panic!("{key} must be set in the environment or .env"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
