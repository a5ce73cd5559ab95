//! Run configuration
//!
//! Built once at startup from the `.env` file, the environment and the
//! command line, then passed read-only into the pipeline.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// RPC base URL used when `RPC_URL` is absent or empty
pub const DEFAULT_RPC_URL: &str = "http://localhost:26657";

/// Environment variable holding the RPC base URL
pub const RPC_URL_ENV: &str = "RPC_URL";

/// IP-to-ASN lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AsnSource {
    /// api.iptoasn.com (HTTPS, JSON)
    Iptoasn,
    /// Team Cymru WHOIS (whois.cymru.com:43)
    Cymru,
}

/// Main configuration for a run
#[derive(Debug, Clone)]
pub struct Config {
    /// Node RPC base URL, without the `/net_info` path
    pub rpc_url: String,

    /// Lookup service for peer IPs
    pub asn_source: AsnSource,

    /// Timeout for each HTTP request or WHOIS query (seconds)
    pub timeout_secs: u64,

    /// Draw the interactive chart after printing the summary
    pub show_chart: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            asn_source: AsnSource::Iptoasn,
            timeout_secs: 10,
            show_chart: true,
        }
    }
}

impl Config {
    // Builder-style methods for CLI overrides

    /// Override the RPC URL. Blank values keep the current one.
    pub fn with_rpc_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            let url = url.trim();
            if !url.is_empty() {
                self.rpc_url = url.to_string();
            }
        }
        self
    }

    pub fn with_asn_source(mut self, source: AsnSource) -> Self {
        self.asn_source = source;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_chart(mut self, show_chart: bool) -> Self {
        self.show_chart = show_chart;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            anyhow::bail!(
                "RPC URL ({}) must start with http:// or https://",
                self.rpc_url
            );
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

/// Outcome of loading the optional `.env` file
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Unreadable(dotenvy::Error),
}

impl EnvFile {
    /// Load `.env` from the working directory or its parents.
    ///
    /// Runs before logging is set up, so the outcome is reported later via `log`.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => EnvFile::Loaded(path),
            Err(e) if e.not_found() => EnvFile::Missing,
            Err(e) => EnvFile::Unreadable(e),
        }
    }

    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => debug!("Loaded environment from {:?}", path),
            EnvFile::Missing => warn!("No .env file found, using environment and defaults"),
            EnvFile::Unreadable(e) => {
                warn!("Error loading .env file ({}), using environment and defaults", e)
            }
        }
    }
}
