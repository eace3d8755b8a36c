//! Key/value storage in a local JSON file.
//!
//! The CLI's stand-in for browser local storage: one flat JSON object whose
//! `shopifyCartId` entry remembers the cart between runs. Unknown keys are
//! preserved on write, and a file that is not a JSON object is never
//! overwritten.

use std::path::{Path, PathBuf};

use scamp_core::CartId;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Key under which the cart ID is stored.
pub const CART_ID_KEY: &str = "shopifyCartId";

/// Errors reading or writing the storage file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a JSON object; fix or remove it")]
    Malformed { path: PathBuf },

    #[error("failed to encode storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A JSON key/value file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered cart ID, if any.
    ///
    /// A stored value that is not a cart ID is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read, or
    /// `StorageError::Malformed` if it is not a JSON object.
    pub async fn cart_id(&self) -> Result<Option<CartId>, StorageError> {
        let entries = self.load().await?;
        let Some(raw) = entries.get(CART_ID_KEY).and_then(Value::as_str) else {
            return Ok(None);
        };

        match CartId::parse(raw) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(value = raw, error = %e, "Ignoring stored cart ID");
                Ok(None)
            }
        }
    }

    /// Remember `cart_id`, or forget the stored one when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or holds
    /// something other than a JSON object.
    pub async fn set_cart_id(&self, cart_id: Option<&CartId>) -> Result<(), StorageError> {
        let mut entries = self.load().await?;
        match cart_id {
            Some(id) => entries.insert(CART_ID_KEY.to_string(), Value::String(id.to_string())),
            None => entries.remove(CART_ID_KEY),
        };
        self.save(&entries).await
    }

    async fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) | Err(_) => Err(StorageError::Malformed {
                path: self.path.clone(),
            }),
        }
    }

    async fn save(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await.map_err(io_err)
    }
}
