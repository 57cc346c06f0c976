//! Iconify public API client with on-disk response caching.
//!
//! This module wraps the read-only endpoints of <https://api.iconify.design>:
//! icon set listings, SVG and CSS generation, raw icon data, search and
//! keyword suggestions. Every call is a single GET through the [`HttpCache`],
//! keyed by the full request URL, so repeated identical queries within the
//! query TTL (one minute by default) are served from disk.
//!
//! Icon keys are passed the same way to every function: either one
//! `"prefix:name"` string or the prefix followed by names
//! (`&["mdi", "account", "home"]`). See [`split_prefix_name`].
//!
//! # Examples
//!
//! ```no_run
//! use iconfetch::{Config, IconifyClient};
//! use iconfetch::iconify::{SearchOptions, SvgOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let iconify = IconifyClient::new(&Config::default())?;
//!
//!     let svg = iconify.svg(&["mdi:account"], &SvgOptions::default().height(48)).await?;
//!     println!("{} bytes of SVG", svg.len());
//!
//!     let results = iconify.search("arrow", &SearchOptions::default().limit(64)).await?;
//!     for icon in &results.icons {
//!         println!("{icon}");
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http_cache::HttpCache;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

const SEARCH_LIMIT_MIN: u32 = 32;
const SEARCH_LIMIT_MAX: u32 = 999;

static MISSING_ICON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Could not find icon: ([^\s]*) ").expect("missing icon pattern is valid"));

/// Icon set author
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Icon set license
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub spdx: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Icon set metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconifyInfo {
    pub name: String,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub samples: Vec<String>,
    /// Either one number or a list of heights
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub display_height: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub palette: Option<bool>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

/// `/collection` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub prefix: String,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub info: Option<IconifyInfo>,
    #[serde(default)]
    pub uncategorized: Vec<String>,
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub hidden: Vec<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Character map, only present for sets imported from icon fonts
    #[serde(default)]
    pub chars: HashMap<String, String>,
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
    #[serde(default)]
    pub suffixes: HashMap<String, String>,
}

/// `/search` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching icons as `prefix:name`
    #[serde(default)]
    pub icons: Vec<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub collections: HashMap<String, IconifyInfo>,
    #[serde(default)]
    pub request: HashMap<String, Value>,
}

/// `/keywords` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub matches: Vec<String>,
    #[serde(default)]
    pub invalid: Option<bool>,
}

/// One icon in an Iconify JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconifyIcon {
    pub body: String,
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotate: Option<u8>,
    #[serde(default)]
    pub h_flip: Option<bool>,
    #[serde(default)]
    pub v_flip: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconifyAlias {
    pub parent: String,
    #[serde(default)]
    pub rotate: Option<u8>,
    #[serde(default)]
    pub h_flip: Option<bool>,
    #[serde(default)]
    pub v_flip: Option<bool>,
}

/// Iconify JSON document as returned by `/<prefix>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconifyJson {
    pub prefix: String,
    #[serde(default)]
    pub icons: HashMap<String, IconifyIcon>,
    #[serde(default)]
    pub aliases: HashMap<String, IconifyAlias>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub last_modified: Option<i64>,
    #[serde(default, rename = "not_found")]
    pub not_found: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    fn as_param(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Both => "horizontal,vertical",
        }
    }
}

/// SVG rotation: quarter turns (1 to 3) or an angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Turns(u8),
    Degrees(u16),
}

impl Rotation {
    /// Interpret a bare number: 1, 2 and 3 are quarter turns, anything else degrees.
    pub fn from_value(value: u16) -> Self {
        match value {
            1..=3 => Self::Turns(value as u8),
            degrees => Self::Degrees(degrees),
        }
    }

    fn as_param(self) -> String {
        match self {
            Self::Turns(turns) => turns.to_string(),
            Self::Degrees(degrees) => format!("{degrees}deg"),
        }
    }
}

/// Query options for [`IconifyClient::svg`]
#[derive(Debug, Clone, Default)]
pub struct SvgOptions {
    /// Replaces `currentColor`
    pub color: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub flip: Option<Flip>,
    pub rotate: Option<Rotation>,
    /// Add an empty rectangle matching the viewBox
    pub viewbox_box: bool,
}

impl SvgOptions {
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn height(mut self, height: impl ToString) -> Self {
        self.height = Some(height.to_string());
        self
    }

    pub fn width(mut self, width: impl ToString) -> Self {
        self.width = Some(width.to_string());
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = Some(flip);
        self
    }

    pub fn rotate(mut self, rotate: Rotation) -> Self {
        self.rotate = Some(rotate);
        self
    }

    pub fn viewbox_box(mut self, enabled: bool) -> Self {
        self.viewbox_box = enabled;
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push(&mut params, "color", self.color.clone());
        push(&mut params, "height", self.height.clone());
        push(&mut params, "width", self.width.clone());
        push(&mut params, "flip", self.flip.map(|f| f.as_param().to_string()));
        push(&mut params, "rotate", self.rotate.map(Rotation::as_param));
        if self.viewbox_box {
            params.push(("box", "1".to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssMode {
    Mask,
    Background,
}

/// Stylesheet formatting, as in Sass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetFormat {
    Expanded,
    Compact,
    Compressed,
}

/// Query options for [`IconifyClient::css`]
#[derive(Debug, Clone, Default)]
pub struct CssOptions {
    /// Icon selector, default `.icon--{prefix}--{name}`
    pub selector: Option<String>,
    /// Common selector, default `.icon--{prefix}`
    pub common: Option<String>,
    /// Icon-specific override selector
    pub override_selector: Option<String>,
    /// Selector is a pseudo-selector such as `::after`
    pub pseudo: bool,
    /// Variable name for the icon
    pub var: Option<String>,
    /// Force 1em width
    pub square: bool,
    pub color: Option<String>,
    pub mode: Option<CssMode>,
    pub format: Option<StylesheetFormat>,
}

impl CssOptions {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push(&mut params, "selector", self.selector.clone());
        push(&mut params, "common", self.common.clone());
        push(&mut params, "override", self.override_selector.clone());
        push(&mut params, "var", self.var.clone());
        push(&mut params, "color", self.color.clone());
        push(
            &mut params,
            "mode",
            self.mode.map(|m| match m {
                CssMode::Mask => "mask".to_string(),
                CssMode::Background => "background".to_string(),
            }),
        );
        push(
            &mut params,
            "format",
            self.format.map(|f| match f {
                StylesheetFormat::Expanded => "expanded".to_string(),
                StylesheetFormat::Compact => "compact".to_string(),
                StylesheetFormat::Compressed => "compressed".to_string(),
            }),
        );
        if self.pseudo {
            params.push(("pseudo", "1".to_string()));
        }
        if self.square {
            params.push(("square", "1".to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconStyle {
    Fill,
    Stroke,
}

/// Query options for [`IconifyClient::search`]
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Clamped to 32..=999 by the API; clamped here too
    pub limit: Option<u32>,
    pub start: Option<u32>,
    /// One prefix is sent as `prefix`, several as `prefixes`. Partial
    /// prefixes ending in `-` match families (`mdi-` matches `mdi-light`).
    pub prefixes: Vec<String>,
    pub category: Option<String>,
    /// Inline `palette=` keyword
    pub palette: Option<bool>,
    /// Inline `style=` keyword
    pub style: Option<IconStyle>,
}

impl SearchOptions {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn palette(mut self, palette: bool) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn style(mut self, style: IconStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Append the inline keyword filters to a free-text query.
    fn query_string(&self, query: &str) -> String {
        let mut query = query.trim().to_string();
        if let Some(palette) = self.palette {
            query.push_str(&format!(" palette={palette}"));
        }
        if let Some(style) = self.style {
            query.push_str(match style {
                IconStyle::Fill => " style=fill",
                IconStyle::Stroke => " style=stroke",
            });
        }
        query
    }

    fn params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", self.query_string(query))];
        push(
            &mut params,
            "limit",
            self.limit.map(|l| l.clamp(SEARCH_LIMIT_MIN, SEARCH_LIMIT_MAX)),
        );
        push(&mut params, "start", self.start);
        match self.prefixes.as_slice() {
            [] => {}
            [prefix] => params.push(("prefix", prefix.clone())),
            prefixes => params.push(("prefixes", prefixes.join(","))),
        }
        push(&mut params, "category", self.category.clone());
        params
    }
}

fn push<T: ToString>(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.push((key, value.to_string()));
    }
}

/// Iconify API client
#[derive(Clone, Debug)]
pub struct IconifyClient {
    http: HttpCache,
    root: String,
    query_ttl: Duration,
    version_ttl: Duration,
}

impl IconifyClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_http(HttpCache::new(config)?, config))
    }

    /// Build a client on an existing cache, e.g. the one a
    /// [`Registry`](crate::Registry) already holds.
    pub fn with_http(http: HttpCache, config: &Config) -> Self {
        Self {
            http,
            root: config.endpoints.iconify.trim_end_matches('/').to_string(),
            query_ttl: config.query_ttl,
            version_ttl: config.version_ttl,
        }
    }

    /// Icon sets keyed by prefix. An empty `prefixes` lists every set.
    pub async fn collections(&self, prefixes: &[&str]) -> Result<HashMap<String, IconifyInfo>> {
        let mut params = Vec::new();
        if !prefixes.is_empty() {
            params.push(("prefixes", prefixes.join(",")));
        }
        self.http
            .get_json(&format!("{}/collections", self.root), &params, self.query_ttl)
            .await
    }

    /// Icons of one set, optionally with set info and the character map.
    pub async fn collection(&self, prefix: &str, info: bool, chars: bool) -> Result<CollectionResponse> {
        let mut params = vec![("prefix", prefix.to_string())];
        if info {
            params.push(("info", "1".to_string()));
        }
        if chars {
            params.push(("chars", "1".to_string()));
        }
        self.http
            .get_json(&format!("{}/collection", self.root), &params, self.query_ttl)
            .await
    }

    /// Last modification time of icon sets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponseShape`] if the response has no
    /// `lastModified` object.
    pub async fn last_modified(&self, prefixes: &[&str]) -> Result<HashMap<String, DateTime<Utc>>> {
        let url = format!("{}/last-modified", self.root);
        let mut params = Vec::new();
        if !prefixes.is_empty() {
            params.push(("prefixes", prefixes.join(",")));
        }

        let content: Value = self.http.get_json(&url, &params, self.query_ttl).await?;
        let entries = content
            .get("lastModified")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::unexpected(&url, "expected 'lastModified'"))?;

        Ok(entries
            .iter()
            .filter_map(|(prefix, ts)| Some((prefix.clone(), DateTime::from_timestamp(ts.as_i64()?, 0)?)))
            .collect())
    }

    /// Render one icon as SVG.
    pub async fn svg(&self, key: &[&str], options: &SvgOptions) -> Result<Vec<u8>> {
        let (prefix, name) = split_prefix_name(key)?;
        self.http
            .get(
                &format!("{}/{}/{}.svg", self.root, prefix, name),
                &options.params(),
                self.query_ttl,
            )
            .await
    }

    /// Generate a stylesheet for icons of one set.
    ///
    /// Icons the API cannot find are logged as a warning; the stylesheet for
    /// the rest is still returned.
    pub async fn css(&self, keys: &[&str], options: &CssOptions) -> Result<String> {
        let (prefix, icons) = split_prefix_names(keys)?;
        let mut params = vec![("icons", icons.join(","))];
        params.extend(options.params());

        let css = self
            .http
            .get_text(&format!("{}/{}.css", self.root, prefix), &params, self.query_ttl)
            .await?;

        let missing = missing_icons(&css);
        if !missing.is_empty() {
            warn!(
                prefix = %prefix,
                missing = ?missing,
                "icons not found, search at https://icon-sets.iconify.design"
            );
        }
        Ok(css)
    }

    /// Raw icon data for icons of one set. Missing icons end up in `not_found`.
    pub async fn icon_data(&self, keys: &[&str]) -> Result<IconifyJson> {
        let (prefix, names) = split_prefix_names(keys)?;
        let params = [("icons", names.join(","))];

        let data: IconifyJson = self
            .http
            .get_json(&format!("{}/{}.json", self.root, prefix), &params, self.query_ttl)
            .await?;

        if !data.not_found.is_empty() {
            warn!(prefix = %prefix, missing = ?data.not_found, "icons not found");
        }
        Ok(data)
    }

    /// Full-text icon search.
    ///
    /// The query may embed keyword filters (`home palette=false`,
    /// `cat style=stroke`); [`SearchOptions::palette`] and
    /// [`SearchOptions::style`] append them for you.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        self.http
            .get_json(&format!("{}/search", self.root), &options.params(query), self.query_ttl)
            .await
    }

    /// Keyword suggestions. `prefix` returns keywords starting with it;
    /// `keyword` returns keywords starting or ending with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if neither is given.
    pub async fn keywords(&self, prefix: Option<&str>, keyword: Option<&str>) -> Result<KeywordsResponse> {
        let params = match (prefix, keyword) {
            (Some(prefix), keyword) => {
                if keyword.is_some() {
                    warn!("cannot specify both prefix and keyword, ignoring keyword");
                }
                [("prefix", prefix.to_string())]
            }
            (None, Some(keyword)) => [("keyword", keyword.to_string())],
            (None, None) => {
                return Err(Error::InvalidQuery(
                    "one of prefix or keyword must be specified".to_string(),
                ));
            }
        };
        self.http
            .get_json(&format!("{}/keywords", self.root), &params, self.query_ttl)
            .await
    }

    /// Version string of the API server.
    pub async fn version(&self) -> Result<String> {
        let text = self
            .http
            .get_text(&format!("{}/version", self.root), &[], self.version_ttl)
            .await?;
        Ok(text.trim().to_string())
    }
}

/// Icon names reported missing in a generated stylesheet.
fn missing_icons(css: &str) -> BTreeSet<String> {
    MISSING_ICON
        .captures_iter(css)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Split a single-icon key into prefix and name.
///
/// Accepts `["prefix:name"]` (exactly one `:`) or `["prefix", "name"]`.
///
/// ```
/// use iconfetch::iconify::split_prefix_name;
///
/// assert_eq!(split_prefix_name(&["mdi:account"]).unwrap(), ("mdi".to_string(), "account".to_string()));
/// assert_eq!(split_prefix_name(&["mdi", "account"]).unwrap(), ("mdi".to_string(), "account".to_string()));
/// assert!(split_prefix_name(&["noColon"]).is_err());
/// assert!(split_prefix_name(&[]).is_err());
/// ```
pub fn split_prefix_name(key: &[&str]) -> Result<(String, String)> {
    match key {
        [single] => split_single(single),
        [prefix, name] => non_empty_pair(prefix, name),
        [] => Err(Error::InvalidIdentifier("icon key must be at least one string".to_string())),
        _ => Err(Error::InvalidIdentifier("icon key must be either 1 or 2 arguments".to_string())),
    }
}

/// Split a multi-icon key into prefix and names.
///
/// Accepts `["prefix:name"]` or `["prefix", "name1", "name2", ...]`.
pub fn split_prefix_names(keys: &[&str]) -> Result<(String, Vec<String>)> {
    match keys {
        [] => Err(Error::InvalidIdentifier("icon key must be at least one string".to_string())),
        [single] => split_single(single).map(|(prefix, name)| (prefix, vec![name])),
        [prefix, names @ ..] => {
            if prefix.is_empty() || names.iter().any(|n| n.is_empty()) {
                return Err(Error::InvalidIdentifier(format!("empty prefix or name in {keys:?}")));
            }
            Ok((prefix.to_string(), names.iter().map(|n| n.to_string()).collect()))
        }
    }
}

fn split_single(key: &str) -> Result<(String, String)> {
    if key.matches(':').count() != 1 {
        return Err(Error::InvalidIdentifier(format!(
            "single-argument icon names must be in the format 'prefix:name', got '{key}'"
        )));
    }
    let (prefix, name) = key.split_once(':').unwrap_or_default();
    non_empty_pair(prefix, name)
}

fn non_empty_pair(prefix: &str, name: &str) -> Result<(String, String)> {
    if prefix.is_empty() || name.is_empty() {
        return Err(Error::InvalidIdentifier(format!(
            "empty prefix or name in '{prefix}:{name}'"
        )));
    }
    Ok((prefix.to_string(), name.to_string()))
}
