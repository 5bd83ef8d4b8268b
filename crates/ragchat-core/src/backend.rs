use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BackendError;

/// Upper bound for the startup health check only. Queries never time out.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    answer: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct LoadResponse {
    #[serde(default)]
    status: Option<String>,
}

/// Client for the question-answering backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
}

impl RagClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one query and return the backend's answer verbatim.
    ///
    /// Exactly one request is made. There is no retry and no timeout.
    pub async fn ask(&self, query: &str) -> Result<String, BackendError> {
        let result = self.send_query(query).await;
        match &result {
            Ok(answer) => info!(answer_len = answer.len(), "answer received"),
            Err(e) => warn!(error = %e, status = ?e.status(), "query failed"),
        }
        result
    }

    async fn send_query(&self, query: &str) -> Result<String, BackendError> {
        let url = format!("{}/query", self.base_url);
        debug!(%url, query_len = query.len(), "sending query");

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), error_detail(&text)));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.answer)
    }

    /// Query the backend root endpoint and return its status message.
    pub async fn health(&self) -> Result<String, BackendError> {
        let url = format!("{}/", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), error_detail(&text)));
        }

        let body: HealthResponse = response.json().await?;
        Ok(body.message.unwrap_or_else(|| "ok".to_string()))
    }

    /// Ask the backend to (re)load its document folder. Ingestion happens
    /// server-side; this only triggers it and returns the reported status.
    pub async fn load_documents(&self) -> Result<String, BackendError> {
        let url = format!("{}/load", self.base_url);
        info!(%url, "requesting document load");

        let response = self.client.post(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = BackendError::from_status(status.as_u16(), error_detail(&text));
            warn!(error = %err, "document load failed");
            return Err(err);
        }

        let body: LoadResponse = response.json().await?;
        Ok(body.status.unwrap_or_else(|| "documents loaded".to_string()))
    }
}

/// Pull the string `detail` field out of an error body, if there is one.
///
/// Validation errors carry `detail` as a list; those fall back to the status.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
