//! Remix Icon.

use super::{DownloadUrls, Provider};
use crate::config::Endpoints;
use crate::error::Result;
use crate::http_cache::HttpCache;
use crate::mapping::{Mapping, css_rule_pattern, extract_css_code_points, non_empty, utf8};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const REPO: &str = "Remix-Design/RemixIcon";

static RI_RULE: LazyLock<Regex> = LazyLock::new(|| css_rule_pattern("ri"));

#[derive(Debug, Clone)]
pub struct Remix {
    raw_root: String,
}

impl Remix {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            raw_root: endpoints.github_raw.clone(),
        }
    }
}

#[async_trait]
impl Provider for Remix {
    fn name(&self) -> &str {
        "remix"
    }

    fn prefix(&self) -> &str {
        "ri"
    }

    fn display_name(&self) -> &str {
        "Remix Icon"
    }

    async fn latest_version(&self, _http: &HttpCache) -> Result<String> {
        Ok("master".to_string())
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        let base = format!("{}/{}/{}/fonts", self.raw_root, REPO, version);
        DownloadUrls {
            font: format!("{}/remixicon.ttf", base),
            mapping: format!("{}/remixicon.css", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let css = utf8(self.name(), raw)?;
        non_empty(self.name(), extract_css_code_points(css, &RI_RULE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remix_css_fixture() {
        let css = r#".ri-home-line:before { content: "\ea60"; }"#;
        let mapping = Remix::new(&Endpoints::default())
            .process_mapping(css.as_bytes())
            .unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["home-line"], "0xea60");
    }

    #[test]
    fn test_remix_download_urls() {
        let urls = Remix::new(&Endpoints::all("http://localhost:1234")).download_urls("master");
        assert_eq!(urls.font, "http://localhost:1234/Remix-Design/RemixIcon/master/fonts/remixicon.ttf");
        assert_eq!(urls.mapping, "http://localhost:1234/Remix-Design/RemixIcon/master/fonts/remixicon.css");
    }
}
