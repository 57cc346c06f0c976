//! Runtime configuration: where the cache lives, how long entries stay fresh,
//! and which upstream hosts to talk to.
//!
//! Nothing in this crate reads global state for these values. A [`Config`] is
//! built once and handed to [`Registry::new`](crate::Registry::new) and
//! [`IconifyClient::new`](crate::IconifyClient::new), so tests can point the
//! whole stack at a temporary directory and a local mock server.
//!
//! # Examples
//!
//! ```no_run
//! use iconfetch::{Config, Endpoints};
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_cache_dir("/tmp/iconfetch")
//!     .with_ttl(Duration::from_secs(7 * 24 * 60 * 60))
//!     .with_endpoints(Endpoints::all("http://127.0.0.1:8080"));
//! assert!(config.cache_dir.ends_with("iconfetch"));
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "iconfetch";
const CACHE_DIR_ENV: &str = "ICONFETCH_CACHE_DIR";

/// Fonts and version checks stay fresh for 30 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Iconify query responses.
pub const DEFAULT_QUERY_TTL: Duration = Duration::from_secs(60);
/// Iconify `/version`.
pub const DEFAULT_VERSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Root URLs of every upstream service the crate talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// GitHub REST API (releases and tags).
    pub github_api: String,
    /// Raw file hosting for repository contents.
    pub github_raw: String,
    /// GitHub web host, used for release asset downloads.
    pub github: String,
    /// Iconify public API.
    pub iconify: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            github_raw: "https://raw.githubusercontent.com".to_string(),
            github: "https://github.com".to_string(),
            iconify: "https://api.iconify.design".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at the same base URL.
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            github_api: base.clone(),
            github_raw: base.clone(),
            github: base.clone(),
            iconify: base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the on-disk cache.
    pub cache_dir: PathBuf,
    /// Freshness of version checks and loaded font data.
    pub ttl: Duration,
    /// Freshness of Iconify query responses.
    pub query_ttl: Duration,
    /// Freshness of the Iconify `/version` response.
    pub version_ttl: Duration,
    /// Timeout for metadata and query requests.
    pub request_timeout: Duration,
    /// Timeout for font and mapping downloads.
    pub download_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            ttl: DEFAULT_TTL,
            query_ttl: DEFAULT_QUERY_TTL,
            version_ttl: DEFAULT_VERSION_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Directory holding raw HTTP response bodies.
    pub fn http_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("http")
    }

    /// Directory holding downloaded fonts and derived mapping tables.
    pub fn font_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("fonts")
    }
}

/// Get the cache directory (`$ICONFETCH_CACHE_DIR`, else the platform user
/// cache dir, else `.cache/iconfetch`)
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
        PathBuf::from(dir)
    } else if let Some(cache_home) = dirs::cache_dir() {
        cache_home.join(APP_NAME)
    } else {
        PathBuf::from(".cache").join(APP_NAME)
    }
}
