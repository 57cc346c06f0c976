//! Microsoft VS Code Codicons.

use super::{DownloadUrls, Provider, github};
use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::http_cache::HttpCache;
use crate::mapping::{Mapping, format_code_point, non_empty, normalize_name};
use async_trait::async_trait;
use serde_json::Value;

const REPO: &str = "microsoft/vscode-codicons";

/// The mapping is `src/template/mapping.json`, a flat object of decimal code
/// points. Newer releases wrap each value in an array (`"add": [60000]`);
/// both shapes are accepted.
#[derive(Debug, Clone)]
pub struct Codicons {
    api_root: String,
    raw_root: String,
    web_root: String,
}

impl Codicons {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            api_root: endpoints.github_api.clone(),
            raw_root: endpoints.github_raw.clone(),
            web_root: endpoints.github.clone(),
        }
    }
}

#[async_trait]
impl Provider for Codicons {
    fn name(&self) -> &str {
        "codicons"
    }

    fn prefix(&self) -> &str {
        "msc"
    }

    fn display_name(&self) -> &str {
        "VS Code Codicons"
    }

    async fn latest_version(&self, http: &HttpCache) -> Result<String> {
        github::latest_release(http, &self.api_root, REPO).await
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        DownloadUrls {
            font: format!("{}/{}/releases/download/{}/codicon.ttf", self.web_root, REPO, version),
            mapping: format!("{}/{}/{}/src/template/mapping.json", self.raw_root, REPO, version),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let data: Value = serde_json::from_slice(raw).map_err(|e| Error::malformed(self.name(), e.to_string()))?;
        let entries = data
            .as_object()
            .ok_or_else(|| Error::malformed(self.name(), "expected a JSON object"))?;

        let mapping = entries
            .iter()
            .filter_map(|(name, value)| {
                let code = match value {
                    Value::Number(n) => n.as_u64(),
                    Value::Array(items) => items.iter().find_map(Value::as_u64),
                    _ => None,
                }?;
                let code = u32::try_from(code).ok().filter(|c| char::from_u32(*c).is_some())?;
                Some((normalize_name(name), format_code_point(code)))
            })
            .collect();

        non_empty(self.name(), mapping)
    }
}
