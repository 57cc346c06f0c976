//! Provider registry and icon resolution.
//!
//! The [`Registry`] maps identifier prefixes to [`Provider`]s and turns an
//! identifier such as `"fa.heart"` or `"mdi:home"` into an [`Icon`]: the glyph
//! plus the path of a locally cached font file that contains it.
//!
//! # Caching
//!
//! Font and mapping data are downloaded lazily, the first time a provider is
//! used, and persisted per (provider, version):
//!
//! ```text
//! <cache_dir>/fonts/
//!   fontawesome-regular/
//!     6.5.1/
//!       fontawesome-regular.ttf
//!       mapping.json          # written last; marks the slot complete
//! ```
//!
//! Loaded tables are also kept in memory for the configured TTL, so repeated
//! resolutions against the same provider do no I/O at all. The version check
//! itself goes through the [`HttpCache`], so a fresh process reuses both the
//! version answer and the slot without touching the network.
//!
//! # Examples
//!
//! ```no_run
//! use iconfetch::{Config, Registry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Registry::new(Config::default())?;
//!
//!     let icon = registry.resolve("fa.heart").await?;
//!     println!("{} from {}", icon.character, icon.ttf_path.display());
//!
//!     // Iconify-style identifiers are translated to the matching provider
//!     let icon = registry.resolve("material-symbols:home-rounded").await?;
//!     assert_eq!(icon.font_family, "Google Material Symbols Rounded");
//!
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http_cache::{HttpCache, dir_size, write_atomic};
use crate::mapping::{Mapping, code_point_to_char, format_code_point, normalize_name};
use crate::providers::{self, Provider, translate_iconify};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

const MAPPING_FILE: &str = "mapping.json";
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// A resolved icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// The glyph, a single unicode character.
    pub character: char,
    /// Display name of the font family providing the glyph.
    pub font_family: String,
    /// Locally cached font file containing the glyph.
    pub ttf_path: PathBuf,
}

impl Icon {
    pub fn code_point(&self) -> u32 {
        self.character as u32
    }

    /// Canonical hex form, e.g. `0xf004`.
    pub fn code_point_hex(&self) -> String {
        format_code_point(self.code_point())
    }
}

/// What `mapping.json` holds for one (provider, version) slot.
#[derive(Debug, Serialize, Deserialize)]
struct SlotManifest {
    provider: String,
    version: String,
    icons: Mapping,
}

#[derive(Debug)]
struct LoadedFont {
    version: String,
    font_path: PathBuf,
    mapping: Mapping,
}

#[derive(Clone)]
pub struct Registry {
    providers: HashMap<String, Arc<dyn Provider>>,
    http: HttpCache,
    fonts_dir: PathBuf,
    cache_dir: PathBuf,
    loaded: moka::future::Cache<String, Arc<LoadedFont>>,
}

impl Registry {
    /// Create a registry with every built-in provider.
    pub fn new(config: Config) -> Result<Self> {
        let builtin = providers::builtin(&config.endpoints);
        let mut registry = Self::empty(config)?;
        for provider in builtin {
            registry.register(provider)?;
        }
        Ok(registry)
    }

    /// Create a registry without any providers.
    pub fn empty(config: Config) -> Result<Self> {
        let http = HttpCache::new(&config)?;
        let loaded = moka::future::Cache::builder()
            .max_capacity(64)
            .time_to_live(config.ttl)
            .build();

        Ok(Self {
            providers: HashMap::new(),
            http,
            fonts_dir: config.font_cache_dir(),
            cache_dir: config.cache_dir,
            loaded,
        })
    }

    /// Register a provider under its prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePrefix`] if the prefix is already taken.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<()> {
        let prefix = provider.prefix().to_string();
        if self.providers.contains_key(&prefix) {
            return Err(Error::DuplicatePrefix(prefix));
        }
        self.providers.insert(prefix, provider);
        Ok(())
    }

    pub fn provider(&self, prefix: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(prefix)
    }

    /// Registered providers, sorted by prefix.
    pub fn providers(&self) -> Vec<Arc<dyn Provider>> {
        let mut providers: Vec<_> = self.providers.values().cloned().collect();
        providers.sort_by(|a, b| a.prefix().cmp(b.prefix()));
        providers
    }

    /// The HTTP cache shared by this registry's providers.
    pub fn http(&self) -> &HttpCache {
        &self.http
    }

    /// Resolve `prefix.name` or Iconify-style `prefix:name` to an [`Icon`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIdentifier`] if the identifier has no separator or an
    ///   empty part
    /// - [`Error::UnknownPrefix`] if no provider matches
    /// - [`Error::UnknownIconName`] if the provider has no such icon
    /// - [`Error::UpstreamUnavailable`] / [`Error::MalformedMapping`] if the
    ///   provider's data could not be fetched or parsed
    pub async fn resolve(&self, id: &str) -> Result<Icon> {
        let (prefix, name) = parse_identifier(id)?;
        self.resolve_parts(&prefix, &name).await
    }

    /// Resolve an Iconify identifier (`prefix:name`) only.
    pub async fn resolve_iconify(&self, id: &str) -> Result<Icon> {
        if !id.contains(':') {
            return Err(Error::InvalidIdentifier(format!(
                "expected an Iconify identifier 'prefix:name', got '{id}'"
            )));
        }
        self.resolve(id).await
    }

    async fn resolve_parts(&self, prefix: &str, name: &str) -> Result<Icon> {
        let provider = self
            .provider(prefix)
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
        let font = self.ensure_loaded(provider).await?;

        let code_point = font.mapping.get(name).ok_or_else(|| Error::UnknownIconName {
            prefix: prefix.to_string(),
            name: name.to_string(),
            suggestion: closest_name(&font.mapping, name),
        })?;

        Ok(Icon {
            character: code_point_to_char(code_point)?,
            font_family: provider.display_name().to_string(),
            ttf_path: font.font_path.clone(),
        })
    }

    /// All icon names known for `prefix`, sorted.
    pub async fn icon_names(&self, prefix: &str) -> Result<Vec<String>> {
        let provider = self
            .provider(prefix)
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
        let font = self.ensure_loaded(provider).await?;
        Ok(font.mapping.keys().cloned().collect())
    }

    /// Version currently loaded for `prefix`, loading it if necessary.
    pub async fn loaded_version(&self, prefix: &str) -> Result<String> {
        let provider = self
            .provider(prefix)
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
        Ok(self.ensure_loaded(provider).await?.version.clone())
    }

    /// Forget loaded tables and delete the whole on-disk cache.
    pub async fn clear_cache(&self) -> Result<()> {
        self.loaded.invalidate_all();
        self.http.clear().await?;
        match fs::remove_dir_all(&self.fonts_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Bytes used by the on-disk cache.
    pub fn cache_size(&self) -> Result<u64> {
        dir_size(&self.cache_dir)
    }

    /// Concurrent callers for the same provider share a single load.
    async fn ensure_loaded(&self, provider: &Arc<dyn Provider>) -> Result<Arc<LoadedFont>> {
        self.loaded
            .try_get_with(provider.name().to_string(), async {
                self.load(provider.as_ref()).await.map(Arc::new)
            })
            .await
            .map_err(Error::from)
    }

    async fn load(&self, provider: &dyn Provider) -> Result<LoadedFont> {
        let provider_dir = self.fonts_dir.join(provider.name());

        let version = match provider.latest_version(&self.http).await {
            Ok(version) => version,
            Err(err) => match read_newest_slot(&provider_dir, provider.name()).await {
                Some(font) => {
                    warn!(
                        provider = provider.name(),
                        version = %font.version,
                        error = %err,
                        "version check failed, using cached font"
                    );
                    return Ok(font);
                }
                None => return Err(err),
            },
        };

        let slot_dir = provider_dir.join(slot_name(&version));
        let font_path = slot_dir.join(format!("{}.ttf", provider.name()));

        if let Some(font) = read_slot(&slot_dir, &font_path).await {
            debug!(provider = provider.name(), %version, "font cache hit");
            return Ok(font);
        }

        info!(provider = provider.name(), %version, "downloading font and mapping");
        let urls = provider.download_urls(&version);
        let font_bytes = self.http.download(&urls.font).await?;
        let mapping_bytes = self.http.download(&urls.mapping).await?;
        let mapping = provider.process_mapping(&mapping_bytes)?;
        debug!(provider = provider.name(), icons = mapping.len(), "parsed mapping");

        let manifest = SlotManifest {
            provider: provider.name().to_string(),
            version: version.clone(),
            icons: mapping,
        };
        write_atomic(&font_path, &font_bytes).await?;
        write_atomic(&slot_dir.join(MAPPING_FILE), &serde_json::to_vec(&manifest)?).await?;
        prune_other_slots(&provider_dir, &slot_dir).await;

        Ok(LoadedFont {
            version,
            font_path,
            mapping: manifest.icons,
        })
    }
}

/// Split an identifier into a local provider prefix and a normalized icon name.
///
/// `prefix.name` is the local form. Anything containing `:` is treated as an
/// Iconify identifier and translated to the matching local provider.
pub fn parse_identifier(id: &str) -> Result<(String, String)> {
    let invalid = || Error::InvalidIdentifier(format!("expected 'prefix.name' or 'prefix:name', got '{id}'"));

    if let Some((prefix, name)) = id.split_once(':') {
        if prefix.is_empty() || name.is_empty() || name.contains(':') {
            return Err(invalid());
        }
        let (local, name) =
            translate_iconify(prefix, &normalize_name(name)).ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
        return Ok((local.to_string(), name));
    }

    let (prefix, name) = id.split_once('.').ok_or_else(invalid)?;
    let name = normalize_name(name);
    if prefix.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    Ok((prefix.to_string(), name))
}

/// Closest icon name, if any is similar enough to be worth suggesting.
fn closest_name(mapping: &Mapping, name: &str) -> Option<String> {
    mapping
        .keys()
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.clone())
}

/// Directory name for a version string.
fn slot_name(version: &str) -> String {
    let name: String = version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match name.trim_start_matches('.') {
        "" => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Load a complete slot, or `None` if it is missing or unreadable.
async fn read_slot(slot_dir: &Path, font_path: &Path) -> Option<LoadedFont> {
    if !fs::try_exists(font_path).await.unwrap_or(false) {
        return None;
    }

    let raw = fs::read(slot_dir.join(MAPPING_FILE)).await.ok()?;
    match serde_json::from_slice::<SlotManifest>(&raw) {
        Ok(manifest) => Some(LoadedFont {
            version: manifest.version,
            font_path: font_path.to_path_buf(),
            mapping: manifest.icons,
        }),
        Err(e) => {
            warn!(path = %slot_dir.display(), error = %e, "ignoring corrupt mapping cache");
            None
        }
    }
}

/// Most recently written complete slot of a provider.
async fn read_newest_slot(provider_dir: &Path, provider_name: &str) -> Option<LoadedFont> {
    let mut entries = fs::read_dir(provider_dir).await.ok()?;
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let mapping = entry.path().join(MAPPING_FILE);
        let Ok(modified) = fs::metadata(&mapping).await.and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }

    let (_, slot_dir) = newest?;
    let font_path = slot_dir.join(format!("{}.ttf", provider_name));
    read_slot(&slot_dir, &font_path).await
}

/// Remove every slot of a provider except `keep`.
async fn prune_other_slots(provider_dir: &Path, keep: &Path) {
    let Ok(mut entries) = fs::read_dir(provider_dir).await else {
        return;
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path == keep || !entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            continue;
        }
        match fs::remove_dir_all(&path).await {
            Ok(()) => debug!(path = %path.display(), "pruned old font version"),
            Err(e) => debug!(path = %path.display(), error = %e, "failed to prune old font version"),
        }
    }
}
