use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_PAGE_SIZE: u32 = 12;

/// Front-end configuration loaded from environment variables.
pub struct Config {
    pub port: u16,
    /// Base URL of the hosted prompt storage API.
    pub api_url: String,
    pub api_key: Option<String>,
    /// Profile directory holding locally persisted state.
    pub data_dir: PathBuf,
    /// Page size of the infinite-scroll prompt list.
    pub page_size: u32,
    pub sentry_dsn: Option<String>,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_raw_values(RawConfig {
            port: std::env::var("PORT").ok().as_deref(),
            api_url: std::env::var("SPS_API_URL").ok().as_deref(),
            api_key: std::env::var("SPS_API_KEY").ok().as_deref(),
            data_dir: std::env::var("SPS_DATA_DIR").ok().as_deref(),
            page_size: std::env::var("SPS_PAGE_SIZE").ok().as_deref(),
            sentry_dsn: std::env::var("SENTRY_DSN").ok().as_deref(),
            environment: std::env::var("ENVIRONMENT").ok().as_deref(),
        })
    }

    /// Build a Config from raw string values (as they would come from env vars).
    /// Used directly in tests to avoid mutating process-global environment.
    pub fn from_raw_values(raw: RawConfig<'_>) -> Self {
        let port = raw
            .port
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_url = non_empty(raw.api_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = non_empty(raw.api_key);

        let data_dir = non_empty(raw.data_dir)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let page_size = raw
            .page_size
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let sentry_dsn = non_empty(raw.sentry_dsn);

        let environment = non_empty(raw.environment).unwrap_or_else(|| "local".to_string());

        Config {
            port,
            api_url,
            api_key,
            data_dir,
            page_size,
            sentry_dsn,
            environment,
        }
    }
}

/// Unparsed configuration values, one per environment variable.
#[derive(Default)]
pub struct RawConfig<'a> {
    pub port: Option<&'a str>,
    pub api_url: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub data_dir: Option<&'a str>,
    pub page_size: Option<&'a str>,
    pub sentry_dsn: Option<&'a str>,
    pub environment: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(String::from)
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sps")
}
