//! Font Awesome 6 Free (Regular, Solid) and Brands.
//!
//! All three styles share one `metadata/icons.json`, where each icon lists the
//! styles it ships in:
//!
//! ```json
//! { "heart": { "unicode": "f004", "styles": ["solid", "regular"] } }
//! ```

use super::{DownloadUrls, Provider, github};
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::http_cache::HttpCache;
use crate::mapping::{Mapping, format_code_point, non_empty, normalize_code_point, normalize_name};
use async_trait::async_trait;
use serde_json::Value;

const REPO: &str = "FortAwesome/Font-Awesome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontAwesomeStyle {
    Regular,
    Solid,
    Brands,
}

impl FontAwesomeStyle {
    /// Style key as it appears in `icons.json`.
    fn key(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Solid => "solid",
            Self::Brands => "brands",
        }
    }

    fn font_file(self) -> &'static str {
        match self {
            Self::Regular => "fa-regular-400.ttf",
            Self::Solid => "fa-solid-900.ttf",
            Self::Brands => "fa-brands-400.ttf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontAwesome {
    style: FontAwesomeStyle,
    name: &'static str,
    prefix: &'static str,
    display_name: &'static str,
    api_root: String,
    raw_root: String,
}

impl FontAwesome {
    pub fn new(style: FontAwesomeStyle, endpoints: &Endpoints) -> Self {
        let (name, prefix, display_name) = match style {
            FontAwesomeStyle::Regular => ("fontawesome-regular", "fa", "Font Awesome 6 Free Regular"),
            FontAwesomeStyle::Solid => ("fontawesome-solid", "fas", "Font Awesome 6 Free Solid"),
            FontAwesomeStyle::Brands => ("fontawesome-brands", "fab", "Font Awesome 6 Brands"),
        };

        Self {
            style,
            name,
            prefix,
            display_name,
            api_root: endpoints.github_api.clone(),
            raw_root: endpoints.github_raw.clone(),
        }
    }
}

#[async_trait]
impl Provider for FontAwesome {
    fn name(&self) -> &str {
        self.name
    }

    fn prefix(&self) -> &str {
        self.prefix
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    async fn latest_version(&self, http: &HttpCache) -> Result<String> {
        github::latest_release(http, &self.api_root, REPO).await
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        let base = format!("{}/{}/{}", self.raw_root, REPO, version);
        DownloadUrls {
            font: format!("{}/webfonts/{}", base, self.style.font_file()),
            mapping: format!("{}/metadata/icons.json", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let data: Value = serde_json::from_slice(raw).map_err(|e| Error::malformed(self.name, e.to_string()))?;
        let icons = data
            .as_object()
            .ok_or_else(|| Error::malformed(self.name, "expected a JSON object of icons"))?;

        let mapping = icons
            .iter()
            .filter(|(_, info)| has_style(info, self.style.key()))
            .filter_map(|(name, info)| {
                let code_point = match info.get("unicode")? {
                    Value::String(s) => normalize_code_point(s)?,
                    Value::Number(n) => format_code_point(u32::try_from(n.as_u64()?).ok()?),
                    _ => return None,
                };
                Some((normalize_name(name), code_point))
            })
            .collect();

        non_empty(self.name, mapping)
    }
}

fn has_style(info: &Value, style: &str) -> bool {
    info.get("styles")
        .and_then(Value::as_array)
        .is_some_and(|styles| styles.iter().any(|s| s.as_str() == Some(style)))
}
