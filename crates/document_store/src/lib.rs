use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use shared::{domain::WaitlistEntry, error::RemoteError};
use tracing::{info, warn};
use uuid::Uuid;

mod appwrite;
pub mod config;

pub use appwrite::AppwriteStore;
pub use config::{BackendConfig, BackendConfigError};

/// Minimal contract of the hosted document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self) -> Result<(), RemoteError>;
    async fn create(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        fields: Value,
    ) -> Result<Value, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityResult {
    Reachable,
    Unreachable(RemoteError),
}

impl ConnectivityResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConnectivityResult::Reachable)
    }

    pub fn error(&self) -> Option<&RemoteError> {
        match self {
            ConnectivityResult::Reachable => None,
            ConnectivityResult::Unreachable(err) => Some(err),
        }
    }
}

/// Outcome of a successful create. The entry is the one that was sent; the store's
/// echo is only mined for its metadata, which may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEntry {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub entry: WaitlistEntry,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentMetadata {
    #[serde(rename = "$id", default)]
    id: Option<String>,
    #[serde(rename = "$createdAt", default)]
    created_at: Option<String>,
}

impl CreatedEntry {
    fn from_response(entry: &WaitlistEntry, response: Value) -> Self {
        let metadata: DocumentMetadata = serde_json::from_value(response).unwrap_or_default();
        let created_at = metadata
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc));

        Self {
            id: metadata.id,
            created_at,
            entry: entry.clone(),
        }
    }
}

/// Waitlist persistence on top of a [`DocumentStore`]. Holds only fixed
/// configuration, so it can be shared freely.
#[derive(Clone)]
pub struct WaitlistBackend {
    store: Arc<dyn DocumentStore>,
    database_id: String,
    collection_id: String,
}

impl WaitlistBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendConfigError> {
        config.validate()?;
        Ok(Self::with_store(
            Arc::new(AppwriteStore::new(config)),
            config.database_id.clone(),
            config.collection_id.clone(),
        ))
    }

    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            database_id: database_id.into(),
            collection_id: collection_id.into(),
        }
    }

    /// Single lightweight read. Failures are returned, never raised.
    pub async fn probe_connectivity(&self) -> ConnectivityResult {
        match self.store.list().await {
            Ok(()) => ConnectivityResult::Reachable,
            Err(err) => {
                warn!(error = %err, "document store connectivity probe failed");
                ConnectivityResult::Unreachable(err)
            }
        }
    }

    /// Persists one entry under a freshly generated document id. Not retried.
    pub async fn create_entry(&self, entry: &WaitlistEntry) -> Result<CreatedEntry, RemoteError> {
        let document_id = Uuid::new_v4().simple().to_string();
        let fields = serde_json::to_value(entry)
            .map_err(|err| RemoteError::transport(format!("failed to encode entry: {err}")))?;

        let created = self
            .store
            .create(&self.database_id, &self.collection_id, &document_id, fields)
            .await?;

        let created = CreatedEntry::from_response(entry, created);
        info!(
            document_id = created.id.as_deref().unwrap_or(&document_id),
            "waitlist entry stored"
        );
        Ok(created)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
