//! Single-attempt HTTP execution of provider requests.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::provider::request::{HttpMethod, ProviderRequest};

/// Default connect/read/total timeout at the connection layer
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// User-Agent sent to providers
pub const DEFAULT_USER_AGENT: &str = concat!("beacon-hub/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Executes one provider request.
///
/// Implementations make exactly one attempt and return the raw body, or
/// `None` on any failure: connection errors, timeouts, malformed URLs and
/// empty bodies all look the same to the caller.
pub trait ResponseFetcher: Send + Sync {
    fn execute(&self, request: &ProviderRequest) -> impl Future<Output = Option<String>> + Send;
}

/// Connection-layer settings for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Applied to connecting and to the whole request
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// [`ResponseFetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend cannot be initialized.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    async fn try_execute(&self, request: &ProviderRequest) -> Result<String, String> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| format!("malformed URL: {e}"))?;
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("response read failed: {e}"))?;

        tracing::trace!(%status, bytes = body.len(), "Provider response received");
        Ok(body)
    }
}

impl ResponseFetcher for HttpFetcher {
    async fn execute(&self, request: &ProviderRequest) -> Option<String> {
        match self.try_execute(request).await {
            Ok(body) if body.trim().is_empty() => {
                tracing::debug!(url = %request.url, "Provider returned an empty body");
                None
            }
            Ok(body) => Some(body),
            Err(error) => {
                tracing::warn!(url = %request.url, %error, "Provider request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::request::ACCEPT_HEADER;
    use wiremock::matchers::{body_string, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn get(url: String) -> ProviderRequest {
        ProviderRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("Accept".to_string(), ACCEPT_HEADER.to_string())],
            body: None,
        }
    }

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(&FetcherConfig {
            timeout,
            ..FetcherConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_client_with_default_config() {
        assert!(HttpFetcher::new(&FetcherConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("chrom", "1"))
            .and(header_exists("accept"))
            .respond_with(ResponseTemplate::new(200).set_body_string("yes"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(Duration::from_secs(2))
            .execute(&get(format!("{}/query?chrom=1", server.uri())))
            .await;
        assert_eq!(body.as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/beacon.php"))
            .and(body_string("chr=1&pos=5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("found"))
            .mount(&server)
            .await;

        let request = ProviderRequest {
            method: HttpMethod::Post,
            url: format!("{}/beacon.php", server.uri()),
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some("chr=1&pos=5".to_string()),
        };
        let body = fetcher(Duration::from_secs(2)).execute(&request).await;
        assert_eq!(body.as_deref(), Some("found"));
    }

    #[tokio::test]
    async fn test_error_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let body = fetcher(Duration::from_secs(2))
            .execute(&get(server.uri()))
            .await;
        assert_eq!(body.as_deref(), Some("not found"));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert!(fetcher(Duration::from_secs(2))
            .execute(&get(server.uri()))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_no_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("yes")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let body = fetcher(Duration::from_millis(200))
            .execute(&get(server.uri()))
            .await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_malformed_url_and_refused_connection() {
        let f = fetcher(Duration::from_secs(1));
        assert!(f.execute(&get("not a url".to_string())).await.is_none());
        assert!(f
            .execute(&get("http://127.0.0.1:9/unreachable".to_string()))
            .await
            .is_none());
    }
}
