use std::time::Duration;

use reqwest::StatusCode;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::debug;
use url::Url;

use super::types::{IndexSearchRequest, IndexSearchResults};
use crate::error::AppError;

/// HTTP client for the external full-text/vector search index.
///
/// Long-lived and read-mostly: one instance is shared across requests for
/// connection pooling. All transport failures are converted to the
/// [`AppError`] taxonomy before they leave this module.
#[derive(Clone)]
pub struct SearchIndexClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    collection: String,
}

impl SearchIndexClient {
    /// # Initialize a new index client
    ///
    /// # Arguments
    /// * `base_url` - Root URL of the index service
    /// * `api_key` - Key sent in the `x-api-key` header
    /// * `collection` - Collection the service searches
    /// * `timeout` - Per-request timeout (short; index calls are expected to
    ///   answer in seconds)
    pub fn new(
        base_url: &str,
        api_key: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Validation(format!("invalid index url '{base_url}': {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_owned(),
            collection: collection.to_owned(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Execute one search call. Connection-level failures are retried with
    /// bounded backoff; auth and server-side failures map straight onto the
    /// error taxonomy.
    pub async fn search(
        &self,
        request: &IndexSearchRequest,
    ) -> Result<IndexSearchResults, AppError> {
        let url = self.search_url()?;
        debug!(
            collection = %self.collection,
            q = %request.q,
            classify = request.classify,
            "issuing index search"
        );

        let retry_strategy = ExponentialBackoff::from_millis(100).map(jitter).take(2);
        let response = Retry::spawn(retry_strategy, || async {
            self.http
                .post(url.clone())
                .header("x-api-key", &self.api_key)
                .json(request)
                .send()
                .await
        })
        .await
        .map_err(classify_transport_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Auth(
                "search index rejected the configured api key".to_string(),
            )),
            status if status.is_server_error() => Err(AppError::Connectivity(format!(
                "search index returned {status}"
            ))),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::InternalError(format!(
                    "search index returned {status}: {body}"
                )))
            }
            _ => response
                .json::<IndexSearchResults>()
                .await
                .map_err(|e| AppError::InternalError(format!("malformed index response: {e}"))),
        }
    }

    /// Readiness check against the index health endpoint.
    pub async fn health(&self) -> Result<(), AppError> {
        let url = self
            .base_url
            .join("health")
            .map_err(|e| AppError::InternalError(format!("invalid health path: {e}")))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Connectivity(format!(
                "index health check returned {}",
                response.status()
            )))
        }
    }

    fn search_url(&self) -> Result<Url, AppError> {
        self.base_url
            .join(&format!(
                "collections/{}/documents/search",
                self.collection
            ))
            .map_err(|e| AppError::InternalError(format!("invalid collection path: {e}")))
    }
}

fn classify_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() || err.is_connect() {
        AppError::Connectivity(format!("search index unreachable: {err}"))
    } else {
        AppError::InternalError(format!("index transport failure: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server_uri: &str) -> SearchIndexClient {
        SearchIndexClient::new(server_uri, "test-key", "products", Duration::from_secs(2))
            .expect("client should build")
    }

    #[tokio::test]
    async fn test_search_sends_api_key_and_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/products/documents/search"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [{ "document": { "sku": "GLV-1", "name": "Nitrile Gloves" } }],
                "found": 1,
                "search_time_ms": 3.5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = IndexSearchRequest::keyword("gloves", "name,sku", 20);
        let results = client.search(&request).await.expect("search should succeed");

        assert_eq!(results.found, 1);
        assert_eq!(results.hits[0].document.name, "Nitrile Gloves");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = IndexSearchRequest::keyword("gloves", "name", 20);
        let err = client.search(&request).await.expect_err("should fail");
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_connectivity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = IndexSearchRequest::keyword("gloves", "name", 20);
        let err = client.search(&request).await.expect_err("should fail");
        assert!(matches!(err, AppError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_unreachable_index_maps_to_connectivity() {
        // Nothing listens on this port.
        let client = client_for("http://127.0.0.1:9");
        let request = IndexSearchRequest::keyword("gloves", "name", 20);
        let err = client.search(&request).await.expect_err("should fail");
        assert!(matches!(err, AppError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.health().await.expect("health should pass");
    }
}
