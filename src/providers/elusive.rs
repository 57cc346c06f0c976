//! Elusive Icons.

use super::{DownloadUrls, Provider};
use crate::config::Endpoints;
use crate::error::Result;
use crate::http_cache::HttpCache;
use crate::mapping::{Mapping, css_rule_pattern, extract_css_code_points, non_empty, utf8};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const REPO: &str = "dovy/elusive-icons";

static EL_RULE: LazyLock<Regex> = LazyLock::new(|| css_rule_pattern("el"));

#[derive(Debug, Clone)]
pub struct Elusive {
    raw_root: String,
}

impl Elusive {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            raw_root: endpoints.github_raw.clone(),
        }
    }
}

#[async_trait]
impl Provider for Elusive {
    fn name(&self) -> &str {
        "elusive"
    }

    fn prefix(&self) -> &str {
        "el"
    }

    fn display_name(&self) -> &str {
        "Elusive Icons"
    }

    // Upstream is unmaintained; master is the only meaningful version
    async fn latest_version(&self, _http: &HttpCache) -> Result<String> {
        Ok("master".to_string())
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        let base = format!("{}/{}/{}", self.raw_root, REPO, version);
        DownloadUrls {
            font: format!("{}/fonts/elusiveicons-webfont.ttf", base),
            mapping: format!("{}/css/elusive-icons.css", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let css = utf8(self.name(), raw)?;
        non_empty(self.name(), extract_css_code_points(css, &EL_RULE))
    }
}
