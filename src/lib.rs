//! Resolve icon identifiers to glyphs in locally cached icon fonts.
//!
//! An identifier names an icon within a provider, either in local form
//! (`"fa.heart"`, `"mdi.home"`) or Iconify form (`"fa6-regular:heart"`,
//! `"material-symbols:home-rounded"`). Resolving it downloads the provider's
//! font and code point mapping on first use and returns the character together
//! with the font file it lives in, ready to hand to a text renderer.
//!
//! Built-in providers:
//!
//! | Prefix | Font |
//! |--------|------|
//! | `fa`, `fas`, `fab` | Font Awesome regular, solid, brands |
//! | `mdi` | Material Design Icons |
//! | `mso`, `msr`, `mss` | Google Material Symbols outlined, rounded, sharp |
//! | `msc` | Microsoft Codicons |
//! | `ph` | Phosphor |
//! | `ri` | Remix Icon |
//! | `el` | Elusive Icons |
//!
//! The [`iconify`] module additionally wraps the Iconify web API (SVG, CSS,
//! search and metadata queries).
//!
//! # Examples
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let icon = iconfetch::get_icon("fa.heart").await?;
//!     println!("{} ({}) in {}", icon.character, icon.code_point_hex(), icon.ttf_path.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http_cache;
pub mod iconify;
pub mod mapping;
pub mod providers;
pub mod registry;

pub use config::{Config, Endpoints};
pub use error::{Error, Result};
pub use http_cache::HttpCache;
pub use iconify::IconifyClient;
pub use providers::Provider;
pub use registry::{Icon, Registry, parse_identifier};

/// Resolve an identifier with the default configuration.
///
/// Builds a fresh [`Registry`]; hold on to one yourself when resolving many
/// icons so loaded mappings stay in memory.
pub async fn get_icon(id: &str) -> Result<Icon> {
    Registry::new(Config::default())?.resolve(id).await
}

/// Resolve an Iconify identifier (`prefix:name`) with the default configuration.
pub async fn get_icon_from_iconify_id(id: &str) -> Result<Icon> {
    Registry::new(Config::default())?.resolve_iconify(id).await
}

/// Blocking variant of [`get_icon`] for callers without an async runtime.
///
/// Must not be called from within a tokio runtime.
pub fn get_icon_blocking(id: &str) -> Result<Icon> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(get_icon(id))
}
