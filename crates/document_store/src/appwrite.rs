//! REST client for an Appwrite-compatible document store.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use shared::error::RemoteError;
use tracing::debug;
use url::Url;

use crate::{config::BackendConfig, DocumentStore};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const API_KEY_HEADER: &str = "X-Appwrite-Key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a> {
    document_id: &'a str,
    data: &'a Value,
}

pub struct AppwriteStore {
    http: Client,
    endpoint: Url,
    project_id: String,
    api_key: Option<String>,
}

impl AppwriteStore {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &BackendConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::transport(format!("endpoint {} cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(PROJECT_HEADER, &self.project_id);
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    async fn list(&self) -> Result<(), RemoteError> {
        let url = self.url(&["databases"])?;
        debug!(%url, "listing databases");
        let res = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(transport_error)?;
        read_response(res).await.map(|_| ())
    }

    async fn create(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        fields: Value,
    ) -> Result<Value, RemoteError> {
        let url = self.url(&[
            "databases",
            database_id,
            "collections",
            collection_id,
            "documents",
        ])?;
        debug!(%url, document_id, "creating document");
        let res = self
            .authorize(self.http.post(url))
            .json(&CreateDocumentRequest {
                document_id,
                data: &fields,
            })
            .send()
            .await
            .map_err(transport_error)?;
        read_response(res).await
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError {
        code: err.status().map(|status| status.as_u16()),
        kind: None,
        message: Some(err.to_string()),
    }
}

async fn read_response(res: Response) -> Result<Value, RemoteError> {
    let status = res.status();
    if status.is_success() {
        // The request was accepted; an unreadable echo does not undo that.
        let body = res.text().await.unwrap_or_default();
        return Ok(serde_json::from_str(&body).unwrap_or(Value::Null));
    }

    let body = res.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<RemoteError>(&body) {
        Ok(mut err) => {
            if err.code.unwrap_or(0) == 0 {
                err.code = Some(status.as_u16());
            }
            err
        }
        Err(_) => RemoteError {
            code: Some(status.as_u16()),
            kind: None,
            message: Some(if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            } else {
                body
            }),
        },
    };
    Err(err)
}
