use std::fmt;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Where waitlist entries are stored. Built once at startup and handed to
/// [`crate::WaitlistBackend::new`].
#[derive(Clone)]
pub struct BackendConfig {
    pub endpoint: Url,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendConfigError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("missing required setting '{0}'")]
    MissingSetting(&'static str),
}

impl BackendConfig {
    pub fn new(
        endpoint: &str,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Result<Self, BackendConfigError> {
        let config = Self {
            endpoint: parse_endpoint(endpoint)?,
            project_id: project_id.into(),
            database_id: database_id.into(),
            collection_id: collection_id.into(),
            api_key: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    pub fn validate(&self) -> Result<(), BackendConfigError> {
        for (name, value) in [
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("collection_id", &self.collection_id),
        ] {
            if value.trim().is_empty() {
                return Err(BackendConfigError::MissingSetting(name));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url, BackendConfigError> {
    let invalid = |reason: String| BackendConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot be used as a base".to_string()));
    }
    Ok(url)
}
