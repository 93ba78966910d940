use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, StorageKind};

/// Screenshot uploads larger than this are rejected before touching storage.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write screenshot to disk: {0}")]
    Io(#[from] std::io::Error),
    #[error("cloud storage request failed: {0}")]
    Upload(#[from] reqwest::Error),
    #[error("cloud storage returned status {0}")]
    UploadStatus(u16),
    #[error("cloud storage is not configured")]
    Misconfigured,
}

/// Where uploaded payment screenshots end up. Picked once at startup from
/// `STORAGE_BACKEND`; handlers only see the `store` method.
#[derive(Clone)]
pub enum StorageBackend {
    LocalDisk {
        dir: PathBuf,
    },
    CloudObject {
        client: reqwest::Client,
        base_url: String,
        access_key: String,
    },
}

impl StorageBackend {
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        match config.storage {
            StorageKind::LocalDisk => Ok(StorageBackend::LocalDisk {
                dir: PathBuf::from(&config.upload_dir),
            }),
            StorageKind::CloudObject => {
                let (Some(base_url), Some(access_key)) = (
                    config.cloud_storage_url.clone(),
                    config.cloud_storage_key.clone(),
                ) else {
                    return Err(StorageError::Misconfigured);
                };
                Ok(StorageBackend::CloudObject {
                    client: reqwest::Client::new(),
                    base_url: base_url.trim_end_matches('/').to_string(),
                    access_key,
                })
            }
        }
    }

    /// Store the screenshot bytes and return the reference recorded on the
    /// registration: a local `/uploads/...` path or the cloud object URL.
    pub async fn store(
        &self,
        original_filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let key = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension_for(content_type, original_filename)
        );

        match self {
            StorageBackend::LocalDisk { dir } => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(&key);
                tokio::fs::write(&path, bytes).await?;
                info!("Stored screenshot at {}", path.display());
                Ok(format!("/uploads/{}", key))
            }
            StorageBackend::CloudObject {
                client,
                base_url,
                access_key,
            } => {
                let url = format!("{}/{}", base_url, key);
                let resp = client
                    .put(&url)
                    .bearer_auth(access_key)
                    .header("Content-Type", content_type)
                    .body(bytes.to_vec())
                    .send()
                    .await?;
                if !resp.status().is_success() {
                    return Err(StorageError::UploadStatus(resp.status().as_u16()));
                }
                info!("Stored screenshot at {}", url);
                Ok(url)
            }
        }
    }
}

/// Screenshot must be an image and fit the size cap.
pub fn validate_screenshot(content_type: &str, len: usize) -> Result<(), String> {
    if !content_type.starts_with("image/") {
        return Err("Payment screenshot must be an image".to_string());
    }
    if len == 0 {
        return Err("Payment screenshot is empty".to_string());
    }
    if len > MAX_UPLOAD_BYTES {
        return Err("Payment screenshot must be 5MB or smaller".to_string());
    }
    Ok(())
}

fn extension_for(content_type: &str, filename: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => match filename.rsplit('.').next() {
            Some("png") | Some("PNG") => "png",
            Some("jpg") | Some("jpeg") | Some("JPG") | Some("JPEG") => "jpg",
            Some("webp") => "webp",
            _ => "bin",
        },
    }
}
