//! HTTP fetching with per-attempt timeouts and retry.

use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::timeout::with_timeout;
use fairway_core::{FairwayError, FairwayResult};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// HTTP method.
    pub method: Method,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
        }
    }
}

impl FetchOptions {
    /// GET with the given query parameters.
    #[must_use]
    pub fn get(query: &[(&str, &str)]) -> Self {
        Self {
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

/// A response whose body has been read in full.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl FetchedResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// HTTP client that bounds each attempt by a timeout and retries failures
/// with exponential backoff.
///
/// An attempt covers sending the request and reading the whole body, so a
/// stalled body times out like a stalled connect. A transport error or
/// non-2xx status counts as a failure. Once retries are exhausted the last
/// non-2xx response is returned as-is so callers can inspect it; the last
/// transport error is returned as `Err`.
#[derive(Clone)]
pub struct RetryableFetcher {
    service: String,
    client: reqwest::Client,
    timeout: Duration,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RetryableFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableFetcher")
            .field("service", &self.service)
            .field("timeout", &self.timeout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryableFetcher {
    /// Creates a fetcher for `service` with the given per-attempt timeout.
    pub fn new(service: impl Into<String>, timeout: Duration, max_retries: u32) -> FairwayResult<Self> {
        let service = service.into();
        let client = reqwest::Client::builder()
            .user_agent(concat!("fairway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FairwayError::internal(format!("Failed to build HTTP client for {}: {}", service, e)))?;

        Ok(Self {
            service,
            client,
            timeout,
            policy: RetryPolicy::with_max_retries(max_retries),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Issues the request, retrying on transport errors and non-2xx statuses.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> FairwayResult<FetchedResponse> {
        self.policy
            .run(
                self.sleeper.as_ref(),
                |attempt| self.attempt(url, options, attempt),
                |outcome| match outcome {
                    Ok(resp) => !resp.status().is_success(),
                    Err(_) => true,
                },
            )
            .await
    }

    /// Fetches `url` and decodes a JSON body.
    ///
    /// A non-2xx final status maps to [`FairwayError::Http`].
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> FairwayResult<T> {
        let response = self.fetch(url, &FetchOptions::get(query)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FairwayError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        serde_json::from_slice(response.body())
            .map_err(|e| FairwayError::external(&self.service, format!("Malformed response from {}: {}", url, e)))
    }

    async fn attempt(&self, url: &str, options: &FetchOptions, attempt: u32) -> FairwayResult<FetchedResponse> {
        let request = self
            .client
            .request(options.method.clone(), url)
            .query(&options.query);

        // Only the path is logged; the query string may carry credentials.
        debug!(service = %self.service, url, attempt = attempt + 1, "Sending request");

        let result = with_timeout(self.timeout, || async {
            let response = request
                .send()
                .await
                .map_err(|e| map_transport_error(&self.service, url, e))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| map_transport_error(&self.service, url, e))?;
            Ok(FetchedResponse {
                status,
                body: body.to_vec(),
            })
        })
        .await;

        match &result {
            Ok(resp) if !resp.status().is_success() => {
                warn!(service = %self.service, url, status = resp.status().as_u16(), attempt = attempt + 1, "Upstream returned error status");
            }
            Err(e) => {
                warn!(service = %self.service, url, attempt = attempt + 1, error = %e, "Request failed");
            }
            Ok(_) => {}
        }

        result
    }
}

fn map_transport_error(service: &str, url: &str, err: reqwest::Error) -> FairwayError {
    if err.is_timeout() {
        FairwayError::Timeout(format!("{} request to {} timed out", service, url))
    } else {
        FairwayError::Network(format!("{} request to {} failed: {}", service, url, err.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RecordingSleeper;
    use serde::Deserialize;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        ok: bool,
    }

    fn fetcher(retries: u32, sleeper: Arc<RecordingSleeper>) -> RetryableFetcher {
        RetryableFetcher::new("test", Duration::from_secs(5), retries)
            .unwrap()
            .with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn test_get_json_success_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("key", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let ping: Ping = fetcher(3, sleeper.clone())
            .get_json(&format!("{}/ping", server.uri()), &[("key", "abc")])
            .await
            .unwrap();

        assert_eq!(ping, Ping { ok: true });
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let ping: Ping = fetcher(3, sleeper.clone())
            .get_json(&format!("{}/flaky", server.uri()), &[])
            .await
            .unwrap();

        assert!(ping.ok);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let response = fetcher(3, sleeper.clone())
            .fetch(&format!("{}/down", server.uri()), &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[tokio::test]
    async fn test_get_json_maps_final_status_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let err = fetcher(1, sleeper)
            .get_json::<Ping>(&format!("{}/missing", server.uri()), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, FairwayError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let err = fetcher(0, sleeper)
            .get_json::<Ping>(&format!("{}/garbage", server.uri()), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, FairwayError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let fetcher = RetryableFetcher::new("test", Duration::from_millis(50), 1)
            .unwrap()
            .with_sleeper(sleeper.clone());

        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()), &FetchOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FairwayError::Timeout(_)));
        assert_eq!(sleeper.delays().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_body_times_out_and_retries() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut request = [0u8; 1024];
                    let _ = socket.read(&mut request).await;
                    let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"ok\":";
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    drop(socket);
                });
            }
        });

        let sleeper = Arc::new(RecordingSleeper::new());
        let fetcher = RetryableFetcher::new("test", Duration::from_millis(200), 1)
            .unwrap()
            .with_sleeper(sleeper.clone());

        let outcome = tokio::time::timeout(
            Duration::from_secs(3),
            fetcher.get_json::<Ping>(&format!("http://{}/stall", addr), &[]),
        )
        .await
        .expect("stalled body must be bounded by the fetcher timeout");

        assert!(matches!(outcome, Err(FairwayError::Timeout(_))));
        assert_eq!(sleeper.delays().len(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let err = fetcher(0, sleeper)
            .fetch("http://127.0.0.1:1/unreachable", &FetchOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FairwayError::Network(_)));
    }
}
