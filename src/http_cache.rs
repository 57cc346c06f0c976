//! URL-keyed HTTP response cache on disk.
//!
//! Every cached GET is stored under `<cache_dir>/http/<sha256 of the full URL>`.
//! The full URL includes the query string, so identical requests converge on
//! the same entry. Freshness is the age of the file compared to a TTL chosen by
//! the caller; when the upstream fails and a stale entry exists, the stale body
//! is served instead of the error.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a timed-out or failed request never leaves a partial entry and
//! concurrent writers of the same key simply race to the last rename.
//!
//! # Examples
//!
//! ```no_run
//! use iconfetch::{Config, HttpCache};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = HttpCache::new(&Config::default())?;
//!     let body = http
//!         .get_text("https://api.iconify.design/version", &[], Duration::from_secs(60))
//!         .await?;
//!     println!("{body}");
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, warn};

/// Query parameters as sent on the wire, in order.
pub type Params<'a> = [(&'a str, String)];

#[derive(Clone, Debug)]
pub struct HttpCache {
    client: reqwest::Client,
    dir: PathBuf,
    ttl: Duration,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl HttpCache {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(format!("iconfetch/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            dir: config.http_cache_dir(),
            ttl: config.ttl,
            request_timeout: config.request_timeout,
            download_timeout: config.download_timeout,
        })
    }

    /// Directory holding the cached bodies.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Default freshness for metadata lookups such as version checks.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the cache entry for a fully qualified URL.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{:x}", digest))
    }

    /// Cached GET returning the raw body.
    pub async fn get(&self, url: &str, params: &Params<'_>, ttl: Duration) -> Result<Vec<u8>> {
        self.fetch(url, params, ttl).await.map(|(body, _)| body)
    }

    /// Cached GET decoded as UTF-8 text.
    pub async fn get_text(&self, url: &str, params: &Params<'_>, ttl: Duration) -> Result<String> {
        let (body, path) = self.fetch(url, params, ttl).await?;
        match String::from_utf8(body) {
            Ok(text) => Ok(text),
            Err(e) => {
                evict(&path).await;
                Err(Error::unexpected(url, format!("body is not UTF-8: {e}")))
            }
        }
    }

    /// Cached GET deserialized from JSON.
    ///
    /// A body that does not decode is dropped from the cache, so the next call
    /// asks upstream again instead of failing until the entry expires.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &Params<'_>,
        ttl: Duration,
    ) -> Result<T> {
        let (body, path) = self.fetch(url, params, ttl).await?;
        match serde_json::from_slice(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                evict(&path).await;
                Err(Error::unexpected(url, e.to_string()))
            }
        }
    }

    /// Body plus the path of the cache entry it was stored under.
    async fn fetch(&self, url: &str, params: &Params<'_>, ttl: Duration) -> Result<(Vec<u8>, PathBuf)> {
        let request = self
            .client
            .get(url)
            .query(params)
            .timeout(self.request_timeout)
            .build()
            .map_err(|source| Error::UpstreamUnavailable {
                url: url.to_string(),
                source,
            })?;
        let full_url = request.url().to_string();
        let path = self.entry_path(&full_url);

        if is_cache_fresh(&path, ttl).await {
            if let Ok(body) = fs::read(&path).await {
                debug!(url = %full_url, "http cache hit");
                return Ok((body, path));
            }
        }

        debug!(url = %full_url, "http cache miss");
        match self.execute(request, &full_url).await {
            Ok(body) => {
                // A failed cache write only costs a refetch later
                if let Err(e) = write_atomic(&path, &body).await {
                    warn!(url = %full_url, error = %e, "failed to store http cache entry");
                }
                Ok((body, path))
            }
            Err(err) => match fs::read(&path).await {
                Ok(body) => {
                    warn!(url = %full_url, error = %err, "upstream failed, serving stale cache entry");
                    Ok((body, path))
                }
                Err(_) => Err(err),
            },
        }
    }

    /// Uncached GET with the longer download timeout, for font and mapping files
    /// that are persisted elsewhere.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .build()
            .map_err(|source| Error::UpstreamUnavailable {
                url: url.to_string(),
                source,
            })?;
        debug!(url, "downloading");
        self.execute(request, url).await
    }

    async fn execute(&self, request: reqwest::Request, url: &str) -> Result<Vec<u8>> {
        let unavailable = |source| Error::UpstreamUnavailable {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .execute(request)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?;
        let bytes = response.bytes().await.map_err(unavailable)?;
        Ok(bytes.to_vec())
    }

    /// Remove every cached body.
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn evict(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "failed to evict http cache entry");
    }
}

/// Check if a cached file is still fresh (less than `ttl` old)
async fn is_cache_fresh(path: &Path, ttl: Duration) -> bool {
    let modified = match fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };

    match SystemTime::now().duration_since(modified) {
        Ok(age) => age < ttl,
        // Modified in the future: clock skew, treat as fresh
        Err(_) => true,
    }
}

/// Write `contents` to `path` through a temporary sibling and an atomic rename.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    Ok(())
}

/// Total size in bytes of all files below `path`.
pub(crate) fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;

    if !path.exists() {
        return Ok(0);
    }

    for entry in walkdir::WalkDir::new(path).follow_links(false).max_open(64) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(|e| std::io::Error::other(e.to_string()))?.len();
        }
    }

    Ok(total)
}
