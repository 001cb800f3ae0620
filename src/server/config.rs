use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::source::FetchPolicy;
use crate::store::StorePolicy;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize,)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB (the screenshot travels in the body)
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Timeout for fetching the XML document, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Largest XML document accepted from `xml_url`, in MB
    #[serde(default = "default_max_document_mb")]
    pub max_document_mb: u64,

    /// Retries for transient fetch failures
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Maximum number of stored jobs (0 = unbounded)
    #[serde(default = "default_store_max_entries")]
    pub store_max_entries: usize,

    /// Seconds a finished job stays retrievable (0 = forever)
    #[serde(default = "default_store_ttl_secs")]
    pub store_ttl_secs: u64,

    /// Decode and sniff `base64image` before accepting a job
    #[serde(default = "default_true")]
    pub validate_image: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_document_mb: default_max_document_mb(),
            fetch_retries: default_fetch_retries(),
            store_max_entries: default_store_max_entries(),
            store_ttl_secs: default_store_ttl_secs(),
            validate_image: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `uidump-server.{toml,yaml,json}`
    /// file, overridden by `UIDUMP_SERVER__*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError,> {
        config::Config::builder()
            .add_source(config::File::with_name("uidump-server",).required(false,),)
            .add_source(
                config::Environment::with_prefix("UIDUMP_SERVER",)
                    .separator("__",)
                    .try_parsing(true,),
            )
            .build()?
            .try_deserialize()
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self,) -> Result<SocketAddr, std::net::AddrParseError,> {
        format!("{}:{}", self.bind_addr, self.port).parse()
    }

    /// Get request timeout as Duration
    pub fn timeout(&self,) -> Duration {
        Duration::from_secs(self.timeout_secs,)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self,) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Fetching `xml_url` gets four fifths of the request timeout in total,
    /// so a slow origin fails as a fetch error before the request times out.
    pub fn fetch_policy(&self,) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(self.fetch_timeout_secs,),
            max_bytes: self.max_document_mb * 1024 * 1024,
            max_retries: self.fetch_retries,
            budget: Some(self.timeout() * 4 / 5,),
            ..FetchPolicy::default()
        }
    }

    pub fn store_policy(&self,) -> StorePolicy {
        StorePolicy {
            max_entries: self.store_max_entries,
            ttl:         (self.store_ttl_secs > 0)
                .then(|| Duration::from_secs(self.store_ttl_secs,),),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    20
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_max_document_mb() -> u64 {
    50
}

fn default_fetch_retries() -> u32 {
    2
}

fn default_store_max_entries() -> usize {
    10_000
}

fn default_store_ttl_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}
