//! Phosphor Icons (regular weight).

use super::{DownloadUrls, Provider};
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::http_cache::HttpCache;
use crate::mapping::{Mapping, format_code_point, non_empty, normalize_name};
use async_trait::async_trait;
use serde_json::Value;

const REPO: &str = "phosphor-icons/web";

/// The mapping is an IcoMoon project file. The first icon set holds the
/// regular weight; each icon carries one or more `tags`, all of which resolve
/// to the same glyph. The code point sits in the parallel `selection` array.
#[derive(Debug, Clone)]
pub struct Phosphor {
    raw_root: String,
}

impl Phosphor {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            raw_root: endpoints.github_raw.clone(),
        }
    }
}

#[async_trait]
impl Provider for Phosphor {
    fn name(&self) -> &str {
        "phosphor"
    }

    fn prefix(&self) -> &str {
        "ph"
    }

    fn display_name(&self) -> &str {
        "Phosphor Icons"
    }

    // Tagged releases of phosphor-icons/web lag behind master
    async fn latest_version(&self, _http: &HttpCache) -> Result<String> {
        Ok("master".to_string())
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        let base = format!("{}/{}/{}", self.raw_root, REPO, version);
        DownloadUrls {
            font: format!("{}/src/regular/Phosphor.ttf", base),
            mapping: format!("{}/src/Phosphor.json", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let data: Value = serde_json::from_slice(raw).map_err(|e| Error::malformed(self.name(), e.to_string()))?;
        let icon_set = data
            .pointer("/iconSets/0")
            .ok_or_else(|| Error::malformed(self.name(), "missing iconSets[0]"))?;
        let icons = icon_set
            .get("icons")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::malformed(self.name(), "missing iconSets[0].icons"))?;
        let selection = icon_set.get("selection").and_then(Value::as_array);

        let mut mapping = Mapping::new();
        for (idx, icon) in icons.iter().enumerate() {
            let code = selection
                .and_then(|s| s.get(idx))
                .and_then(|s| s.get("code"))
                .or_else(|| icon.get("code"))
                .or_else(|| icon.get("grid"))
                .and_then(Value::as_u64)
                .and_then(|c| u32::try_from(c).ok())
                .filter(|c| *c != 0 && char::from_u32(*c).is_some());
            let Some(code) = code else {
                continue;
            };

            let tags = icon.get("tags").and_then(Value::as_array).into_iter().flatten();
            for tag in tags.filter_map(Value::as_str) {
                mapping.insert(normalize_name(tag), format_code_point(code));
            }
        }

        non_empty(self.name(), mapping)
    }
}
