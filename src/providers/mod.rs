//! Icon-font providers.
//!
//! A [`Provider`] knows three things about one upstream icon family: how to
//! find its latest version, where the font and mapping files for a version
//! live, and how to turn that family's mapping file into a [`Mapping`].
//! Mapping formats differ between upstreams (Font Awesome metadata JSON, CSS
//! `:before` rules, IcoMoon project files, `.codepoints` text), so each
//! provider owns its parser.
//!
//! | Prefix | Family |
//! |---|---|
//! | `fa`, `fas`, `fab` | Font Awesome 6 Regular, Solid, Brands |
//! | `mdi` | Material Design Icons (community) |
//! | `mso`, `msr`, `mss` | Google Material Symbols Outlined, Rounded, Sharp |
//! | `msc` | VS Code Codicons |
//! | `ph` | Phosphor |
//! | `ri` | Remix Icon |
//! | `el` | Elusive Icons |

mod codicons;
mod elusive;
mod fontawesome;
pub(crate) mod github;
mod material;
mod phosphor;
mod remix;

pub use codicons::Codicons;
pub use elusive::Elusive;
pub use fontawesome::{FontAwesome, FontAwesomeStyle};
pub use material::{MaterialDesign, MaterialSymbols, MaterialSymbolsStyle};
pub use phosphor::Phosphor;
pub use remix::Remix;

use crate::config::Endpoints;
use crate::error::Result;
use crate::http_cache::HttpCache;
use crate::mapping::Mapping;
use async_trait::async_trait;
use std::sync::Arc;

/// Where to download a provider's font and mapping file for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrls {
    pub font: String,
    pub mapping: String,
}

/// One upstream icon-font family.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Internal name, also the cache slot name (e.g. `fontawesome-regular`).
    fn name(&self) -> &str;

    /// Short identifier prefix (e.g. `fa`).
    fn prefix(&self) -> &str;

    /// Human-readable font family name.
    fn display_name(&self) -> &str;

    /// Ask upstream for the latest version string.
    async fn latest_version(&self, http: &HttpCache) -> Result<String>;

    fn download_urls(&self, version: &str) -> DownloadUrls;

    /// Parse the raw mapping file into a normalized name -> code point table.
    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping>;
}

/// Every built-in provider, pointed at `endpoints`.
pub fn builtin(endpoints: &Endpoints) -> Vec<Arc<dyn Provider>> {
    vec![
        Arc::new(FontAwesome::new(FontAwesomeStyle::Regular, endpoints)),
        Arc::new(FontAwesome::new(FontAwesomeStyle::Solid, endpoints)),
        Arc::new(FontAwesome::new(FontAwesomeStyle::Brands, endpoints)),
        Arc::new(MaterialDesign::new(endpoints)),
        Arc::new(MaterialSymbols::new(MaterialSymbolsStyle::Outlined, endpoints)),
        Arc::new(MaterialSymbols::new(MaterialSymbolsStyle::Rounded, endpoints)),
        Arc::new(MaterialSymbols::new(MaterialSymbolsStyle::Sharp, endpoints)),
        Arc::new(Codicons::new(endpoints)),
        Arc::new(Phosphor::new(endpoints)),
        Arc::new(Remix::new(endpoints)),
        Arc::new(Elusive::new(endpoints)),
    ]
}

/// Translate an Iconify `prefix:name` pair to a local provider prefix and icon name.
///
/// Iconify folds the Material Symbols styles into one set with name suffixes
/// (`home-rounded`, `home-outline-sharp`), so the name may be rewritten too.
pub fn translate_iconify(prefix: &str, name: &str) -> Option<(&'static str, String)> {
    let local = match prefix {
        "fa6-regular" => "fa",
        "fa6-solid" => "fas",
        "fa6-brands" => "fab",
        "mdi" => "mdi",
        "codicon" => "msc",
        "ph" => "ph",
        "ri" => "ri",
        "el" => "el",
        "material-symbols" => return Some(translate_material_symbols(name)),
        _ => return None,
    };
    Some((local, name.to_string()))
}

fn translate_material_symbols(name: &str) -> (&'static str, String) {
    let (prefix, base) = if let Some(base) = name.strip_suffix("-rounded") {
        ("msr", base)
    } else if let Some(base) = name.strip_suffix("-sharp") {
        ("mss", base)
    } else {
        ("mso", name)
    };
    let base = base.strip_suffix("-outline").unwrap_or(base);
    (prefix, base.to_string())
}
