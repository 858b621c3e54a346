use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::models::RatioDataset;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SourceError {
    /// Connection trouble, throttling and server errors are worth another try.
    fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            SourceError::Status(s) => *s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error(),
            _ => false,
        }
    }
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable origin of the ratio dataset.
#[async_trait]
pub trait RatioSource: Send + Sync {
    async fn fetch_dataset(&self) -> Result<RatioDataset, SourceError>;
}

/// Build the source the configuration asks for: a local file if one is set,
/// the HTTP API otherwise.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn RatioSource>, SourceError> {
    Ok(match &config.input_file {
        Some(path) => Box::new(FileRatioSource::new(path.clone())),
        None => Box::new(HttpRatioSource::new(config)?),
    })
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

pub struct HttpRatioSource {
    client: reqwest::Client,
    url: Url,
    retry_delay_ms: u64,
    max_retries: usize,
}

impl HttpRatioSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            url: endpoint_url(&config.base_url, &config.endpoint)?,
            retry_delay_ms: config.retry_delay_ms,
            max_retries: config.max_retries,
        })
    }

    async fn get_once(&self) -> Result<String, SourceError> {
        debug!("GET {}", self.url);
        let resp = self.client.get(self.url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

/// `base_url` may carry a path prefix; the endpoint is resolved under it.
fn endpoint_url(base_url: &str, endpoint: &str) -> Result<Url, url::ParseError> {
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    base.join(endpoint.trim_start_matches('/'))
}

#[async_trait]
impl RatioSource for HttpRatioSource {
    async fn fetch_dataset(&self) -> Result<RatioDataset, SourceError> {
        // 2, 4, 8… units of retry_delay_ms, each jittered
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry_delay_ms.max(1))
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.max_retries);

        let body = RetryIf::start(
            strategy,
            || self.get_once(),
            |e: &SourceError| {
                let retry = e.is_transient();
                if retry {
                    warn!("Fetching {} failed, retrying: {}", self.url, e);
                }
                retry
            },
        )
        .await?;

        let dataset = RatioDataset::from_json(&body)?;
        info!("Fetched {} companies from {}", dataset.len(), self.url);
        Ok(dataset)
    }
}

// ── Local file ────────────────────────────────────────────────────────────────

/// Reads a saved API response from disk.
pub struct FileRatioSource {
    path: PathBuf,
}

impl FileRatioSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RatioSource for FileRatioSource {
    async fn fetch_dataset(&self) -> Result<RatioDataset, SourceError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let dataset = RatioDataset::from_json(&body)?;
        info!("Loaded {} companies from {:?}", dataset.len(), self.path);
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://localhost:8000", "/api/financial-ratios/")
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/financial-ratios/"
        );
        assert_eq!(
            endpoint_url("https://host/dash/", "api/financial-ratios/")
                .unwrap()
                .as_str(),
            "https://host/dash/api/financial-ratios/"
        );
        assert!(endpoint_url("not a url", "/api/").is_err());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(SourceError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(SourceError::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!SourceError::Status(StatusCode::NOT_FOUND).is_transient());
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!SourceError::Parse(parse).is_transient());
    }

    #[test]
    fn test_file_source_reads_dataset() {
        let path = temp_file(
            "ratios-ok",
            r#"{"ABC": {"TongSoNamThuThap": 3, "annual_reports": {"2021": {"ROA": 0.1}}}}"#,
        );
        let ds = tokio_test::block_on(FileRatioSource::new(&path).fetch_dataset()).unwrap();
        assert_eq!(ds.first_code(), Some("ABC"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_file_source_errors() {
        let missing = FileRatioSource::new("/nonexistent/ratios.json");
        let err = tokio_test::block_on(missing.fetch_dataset()).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));

        let path = temp_file("ratios-bad", "[1, 2");
        let err = tokio_test::block_on(FileRatioSource::new(&path).fetch_dataset()).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_from_config_prefers_input_file() {
        let path = temp_file("ratios-cfg", r#"{"X": {}}"#);
        let config = SourceConfig {
            input_file: Some(path.clone()),
            ..SourceConfig::default()
        };
        let source = from_config(&config).unwrap();
        let ds = tokio_test::block_on(source.fetch_dataset()).unwrap();
        assert_eq!(ds.len(), 1);
        std::fs::remove_file(path).ok();
    }

    // ── HTTP retry ────────────────────────────────────────────────────────────

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = r#"{"ABC": {"TongSoNamThuThap": 2, "annual_reports": {"2021": {"ROA": 0.1}}}}"#;

    fn http_source(server: &MockServer, max_retries: usize) -> HttpRatioSource {
        HttpRatioSource::new(&SourceConfig {
            base_url: server.uri(),
            retry_delay_ms: 1,
            max_retries,
            ..SourceConfig::default()
        })
        .unwrap()
    }

    async fn mount_status(server: &MockServer, status: u16, times: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path("/api/financial-ratios/"))
            .respond_with(ResponseTemplate::new(status));
        let mock = match times {
            Some(n) => mock.up_to_n_times(n),
            None => mock,
        };
        mock.mount(server).await;
    }

    async fn hits(server: &MockServer) -> usize {
        server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }

    #[test]
    fn test_http_retries_throttling_and_server_errors() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            mount_status(&server, 503, Some(1)).await;
            mount_status(&server, 429, Some(1)).await;
            Mock::given(method("GET"))
                .and(path("/api/financial-ratios/"))
                .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
                .mount(&server)
                .await;

            let ds = http_source(&server, 3).fetch_dataset().await.unwrap();
            assert_eq!(ds.first_code(), Some("ABC"));
            assert_eq!(hits(&server).await, 3);
        });
    }

    #[test]
    fn test_http_client_error_is_not_retried() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            mount_status(&server, 404, None).await;

            let err = http_source(&server, 3).fetch_dataset().await.unwrap_err();
            assert!(matches!(err, SourceError::Status(StatusCode::NOT_FOUND)));
            assert_eq!(hits(&server).await, 1);
        });
    }

    #[test]
    fn test_http_gives_up_after_max_retries() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            mount_status(&server, 500, None).await;

            let err = http_source(&server, 3).fetch_dataset().await.unwrap_err();
            assert!(matches!(err, SourceError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
            assert_eq!(hits(&server).await, 4);
        });
    }

    #[test]
    fn test_http_malformed_body_is_a_parse_error() {
        tokio_test::block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
                .mount(&server)
                .await;

            let err = http_source(&server, 3).fetch_dataset().await.unwrap_err();
            assert!(matches!(err, SourceError::Parse(_)));
            assert_eq!(hits(&server).await, 1);
        });
    }
}
