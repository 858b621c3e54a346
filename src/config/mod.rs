use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the ratio dataset comes from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// First backoff step; later retries grow exponentially from it.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Read the dataset from this JSON file instead of the API.
    #[serde(default)]
    pub input_file: Option<PathBuf>,
}

/// Output directory and pixel sizes of rendered regions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_chart_width")]
    pub chart_width: f64,

    #[serde(default = "default_chart_height")]
    pub chart_height: f64,

    #[serde(default = "default_kpi_width")]
    pub kpi_width: f64,

    #[serde(default = "default_kpi_height")]
    pub kpi_height: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Company selected after load; falls back to the first in the dataset.
    #[serde(default)]
    pub default_company: Option<String>,

    /// "overview", "valuation" or "all"
    #[serde(default = "default_page")]
    pub page: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_endpoint() -> String {
    "/api/financial-ratios/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_max_retries() -> usize {
    3
}
fn default_user_agent() -> String {
    concat!("ratio-dashboard/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_chart_width() -> f64 {
    640.0
}
fn default_chart_height() -> f64 {
    320.0
}
fn default_kpi_width() -> f64 {
    220.0
}
fn default_kpi_height() -> f64 {
    140.0
}
fn default_page() -> String {
    "all".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            input_file: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            kpi_width: default_kpi_width(),
            kpi_height: default_kpi_height(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_company: None,
            page: default_page(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides. A file that
    /// cannot be parsed or values of the wrong type fall back to defaults.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("RATIOS").separator("__"))
            .build();

        Self::from_built(cfg)
    }

    fn from_built(cfg: Result<config::Config, config::ConfigError>) -> Self {
        cfg.and_then(|c| c.try_deserialize()).unwrap_or_else(|e| {
            warn!("Invalid configuration, using defaults: {}", e);
            AppConfig::default()
        })
    }
}
