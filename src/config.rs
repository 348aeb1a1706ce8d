use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::Args;
use url::Url;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_BASE: &str = "https://teachingkit.climatecompatiblegrowth.com/api";
const USER_AGENT: &str = "teachingkit-export/0.1";
const MAX_REDIRECTS: usize = 10;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}'")]
    InvalidBase(String),
    #[error("API base must be http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

// ── Settings ─────────────────────────────────────────────────────────────────

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Base URL of the teaching kit REST API.
    #[arg(long, env = "TEACHINGKIT_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Locale requested for every resource.
    #[arg(long, env = "TEACHINGKIT_LOCALE", default_value = "en", global = true)]
    pub locale: String,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "TEACHINGKIT_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Connect timeout in seconds.
    #[arg(long, env = "TEACHINGKIT_CONNECT_TIMEOUT_SECS", default_value_t = 5, global = true)]
    pub connect_timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[arg(
        long,
        env = "TEACHINGKIT_INSECURE_SSL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub insecure: bool,

    /// Ignore HTTP(S)_PROXY environment settings.
    #[arg(
        long,
        env = "TEACHINGKIT_NO_PROXY",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub no_proxy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            locale: "en".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            insecure: false,
            no_proxy: false,
        }
    }
}

impl Config {
    /// Parse and check the API base. A trailing slash is added so that
    /// resource paths join below it instead of replacing its last segment.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api_base.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let parsed =
            Url::parse(&raw).map_err(|_| ConfigError::InvalidBase(self.api_base.clone()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn build_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT);

        if self.insecure {
            tracing::warn!("TLS certificate validation is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))
    }
}
