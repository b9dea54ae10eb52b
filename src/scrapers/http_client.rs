//! HTTP client shared by the directory fetcher and the geocoder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::USER_AGENT;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Sent when no user agent is configured. The directory serves reduced
/// markup to clients that do not look like a desktop browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Browsers common among the directory's visitors, cycled in `"rotate"` mode.
const ROTATION: &[&str] = &[
    DEFAULT_USER_AGENT,
    "Mozilla/5.0 (Linux; Android 14; SM-A546B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Linux; Android 13; Redmi Note 12) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Mobile Safari/537.36",
];

/// Errors from a single HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug)]
enum UserAgent {
    Fixed(String),
    /// Index of the next entry in `ROTATION`.
    Rotating(AtomicUsize),
}

impl UserAgent {
    fn from_config(value: Option<&str>) -> Self {
        match value {
            None => Self::Fixed(DEFAULT_USER_AGENT.to_string()),
            Some("rotate") => Self::Rotating(AtomicUsize::new(0)),
            Some(custom) => Self::Fixed(custom.to_string()),
        }
    }

    fn next(&self) -> &str {
        match self {
            Self::Fixed(ua) => ua,
            Self::Rotating(cursor) => {
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                ROTATION[i % ROTATION.len()]
            }
        }
    }
}

/// Thin wrapper over `reqwest::Client` with a fixed timeout.
///
/// No retries and no adaptive delay: callers pace themselves.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: Arc<UserAgent>,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - None: desktop Chrome user agent
    /// - Some("rotate"): cycle through common browsers, one per request
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            user_agent: Arc::new(UserAgent::from_config(user_agent)),
        })
    }

    /// GET a URL and return the body as text.
    /// Any non-2xx status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text_with_query(url, &[]).await
    }

    /// GET a URL with query parameters and return the body as text.
    pub async fn get_text_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        // Query strings may carry credentials; keep them out of error text.
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source: source.without_url(),
        };

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.next())
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn client(user_agent: Option<&str>) -> HttpClient {
        HttpClient::new(Duration::from_secs(5), user_agent).unwrap()
    }

    #[test]
    fn test_user_agent_selection() {
        assert_eq!(UserAgent::from_config(None).next(), DEFAULT_USER_AGENT);
        assert_eq!(UserAgent::from_config(Some("MyBot/1.0")).next(), "MyBot/1.0");
    }

    #[test]
    fn test_rotation_wraps_around() {
        let ua = UserAgent::from_config(Some("rotate"));
        let seen: Vec<&str> = (0..ROTATION.len() + 1).map(|_| ua.next()).collect();
        assert_eq!(&seen[..ROTATION.len()], ROTATION);
        assert_eq!(seen[ROTATION.len()], ROTATION[0]);
    }

    #[tokio::test]
    async fn test_get_text_returns_body_and_sends_user_agent() {
        let server = serve_once("200 OK", "<html>ok</html>").await;

        let body = client(None).get_text(&server.url).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
        let request = server.request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get / http/1.1\r\n"));
        assert!(request.contains(&format!("user-agent: {}\r\n", DEFAULT_USER_AGENT.to_lowercase())));
    }

    #[tokio::test]
    async fn test_custom_user_agent_is_sent() {
        let server = serve_once("200 OK", "").await;

        client(Some("PharmaBot/2.0")).get_text(&server.url).await.unwrap();

        let request = server.request.await.unwrap().to_lowercase();
        assert!(request.contains("user-agent: pharmabot/2.0\r\n"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = serve_once("503 Service Unavailable", "busy").await;

        let err = client(None).get_text(&server.url).await.unwrap_err();

        match err {
            FetchError::Status { url, status } => {
                assert_eq!(status, 503);
                assert_eq!(url, server.url);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_is_form_encoded() {
        let server = serve_once("200 OK", "{}").await;
        let url = format!("{}/search", server.url);

        client(None)
            .get_text_with_query(&url, &[("q", "Pharmacie Al Amal, Kénitra"), ("key", "k&v")])
            .await
            .unwrap();

        let request = server.request.await.unwrap();
        assert!(request.starts_with(
            "GET /search?q=Pharmacie+Al+Amal%2C+K%C3%A9nitra&key=k%26v HTTP/1.1\r\n"
        ));
    }
}
