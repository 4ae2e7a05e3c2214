//! Text generation HTTP client.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GenerateError, GenerateResult};
use crate::types::{GenerateRequest, TextAccumulator};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";

/// Configuration for the generation client.
#[derive(Debug, Clone)]
pub struct GenerateClientConfig {
    /// Base URL of the service (without `/generate`)
    pub base_url: String,
    /// API key sent as `x-api-key`
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for connection failures and 5xx answers
    pub max_retries: u32,
}

impl Default for GenerateClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(300), // generation over a full match is slow
            max_retries: 2,
        }
    }
}

/// Client for the `/generate` endpoint.
pub struct GenerateClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    max_retries: u32,
}

impl GenerateClient {
    /// Create a new client. Fails without an API key or with an unusable base URL.
    pub fn new(config: GenerateClientConfig) -> GenerateResult<Self> {
        let api_key = config.api_key.ok_or(GenerateError::MissingApiKey)?;
        let endpoint = generate_endpoint(&config.base_url)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenerateError::Network)?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            max_retries: config.max_retries,
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the service about a video and return the concatenated generated text.
    ///
    /// Undecodable stream lines are skipped. The result may be empty.
    pub async fn generate(&self, request: &GenerateRequest) -> GenerateResult<String> {
        info!(video_id = %request.video_id, "Requesting generated text");

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(self.endpoint.clone())
                    .header("x-api-key", &self.api_key)
                    .json(request)
                    .send()
                    .await?;

                if response.status().is_server_error() {
                    return Err(GenerateError::ServiceUnavailable(response.status().to_string()));
                }
                Ok(response)
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let mut acc = TextAccumulator::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            acc.push(&chunk?);
        }

        let text = acc.finish();
        debug!(chars = text.len(), "Generated text received");
        Ok(text)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> GenerateResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = GenerateResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Generate request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `{base}/generate`, keeping any path prefix of `base`.
fn generate_endpoint(base_url: &str) -> GenerateResult<Url> {
    let invalid = |reason: String| GenerateError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("generate").map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GenerateClientConfig {
        GenerateClientConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
            max_retries: 1,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = GenerateClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_endpoint_keeps_version_prefix() {
        let url = generate_endpoint("https://api.twelvelabs.io/v1.3").unwrap();
        assert_eq!(url.as_str(), "https://api.twelvelabs.io/v1.3/generate");

        let url = generate_endpoint("http://localhost:9000/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/generate");
    }

    #[test]
    fn test_missing_key_and_bad_url() {
        let mut cfg = config("http://localhost");
        cfg.api_key = None;
        assert!(matches!(GenerateClient::new(cfg), Err(GenerateError::MissingApiKey)));

        assert!(matches!(
            GenerateClient::new(config("not a url")),
            Err(GenerateError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_streams_text() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"event_type\":\"stream_start\"}\n",
            "{\"event_type\":\"text_generation\",\"text\":\"Start Time: 10s End Time: 20s \"}\n",
            "{\"event_type\":\"text_generation\",\"text\":\"Title Array = [\\\"Great Goal\\\"]\"}\n",
            "{\"event_type\":\"stream_end\"}\n",
        );

        Mock::given(method("POST"))
            .and(path("/v1.3/generate"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "video_id": "match-1",
                "temperature": 0.2,
                "stream": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenerateClient::new(config(&format!("{}/v1.3", server.uri()))).unwrap();
        let text = client.generate(&GenerateRequest::new("match-1")).await.unwrap();

        assert_eq!(text, "Start Time: 10s End Time: 20s Title Array = [\"Great Goal\"]");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenerateClient::new(config(&server.uri())).unwrap();
        let err = client.generate(&GenerateRequest::new("x")).await.unwrap_err();

        match err {
            GenerateError::RequestFailed { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let client = GenerateClient::new(config(&server.uri())).unwrap();
        let err = client.generate(&GenerateRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, GenerateError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"event_type\":\"stream_end\"}\n"))
            .mount(&server)
            .await;

        let client = GenerateClient::new(config(&server.uri())).unwrap();
        let text = client.generate(&GenerateRequest::new("x")).await.unwrap();
        assert!(text.is_empty());
    }
}
