//! Material Design Icons (community webfont) and Google Material Symbols.

use super::{DownloadUrls, Provider, github};
use crate::config::Endpoints;
use crate::error::Result;
use crate::http_cache::HttpCache;
use crate::mapping::{
    Mapping, css_rule_pattern, extract_css_code_points, non_empty, normalize_code_point, normalize_name, utf8,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const MDI_REPO: &str = "Templarian/MaterialDesign-Webfont";
const SYMBOLS_REPO: &str = "google/material-design-icons";

static MDI_RULE: LazyLock<Regex> = LazyLock::new(|| css_rule_pattern("mdi"));

/// Community Material Design Icons (`mdi`).
///
/// Versions come from the webfont repository's tags; the files themselves are
/// always taken from `master`.
#[derive(Debug, Clone)]
pub struct MaterialDesign {
    api_root: String,
    raw_root: String,
}

impl MaterialDesign {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            api_root: endpoints.github_api.clone(),
            raw_root: endpoints.github_raw.clone(),
        }
    }
}

#[async_trait]
impl Provider for MaterialDesign {
    fn name(&self) -> &str {
        "material"
    }

    fn prefix(&self) -> &str {
        "mdi"
    }

    fn display_name(&self) -> &str {
        "Material Design Icons"
    }

    async fn latest_version(&self, http: &HttpCache) -> Result<String> {
        github::latest_tag(http, &self.api_root, MDI_REPO).await
    }

    fn download_urls(&self, _version: &str) -> DownloadUrls {
        let base = format!("{}/{}/master", self.raw_root, MDI_REPO);
        DownloadUrls {
            font: format!("{}/fonts/materialdesignicons-webfont.ttf", base),
            mapping: format!("{}/css/materialdesignicons.css", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let css = utf8(self.name(), raw)?;
        non_empty(self.name(), extract_css_code_points(css, &MDI_RULE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSymbolsStyle {
    Outlined,
    Rounded,
    Sharp,
}

/// Google Material Symbols variable fonts (`mso`, `msr`, `mss`).
///
/// The mapping is the `.codepoints` file shipped next to each font: one
/// `name hex` pair per line. Names use underscores upstream and are stored
/// with dashes, matching how Iconify and the other providers spell them.
#[derive(Debug, Clone)]
pub struct MaterialSymbols {
    style: MaterialSymbolsStyle,
    raw_root: String,
}

impl MaterialSymbols {
    pub fn new(style: MaterialSymbolsStyle, endpoints: &Endpoints) -> Self {
        Self {
            style,
            raw_root: endpoints.github_raw.clone(),
        }
    }

    fn file_stem(&self) -> &'static str {
        match self.style {
            MaterialSymbolsStyle::Outlined => "MaterialSymbolsOutlined",
            MaterialSymbolsStyle::Rounded => "MaterialSymbolsRounded",
            MaterialSymbolsStyle::Sharp => "MaterialSymbolsSharp",
        }
    }
}

#[async_trait]
impl Provider for MaterialSymbols {
    fn name(&self) -> &str {
        match self.style {
            MaterialSymbolsStyle::Outlined => "material-symbols-outlined",
            MaterialSymbolsStyle::Rounded => "material-symbols-rounded",
            MaterialSymbolsStyle::Sharp => "material-symbols-sharp",
        }
    }

    fn prefix(&self) -> &str {
        match self.style {
            MaterialSymbolsStyle::Outlined => "mso",
            MaterialSymbolsStyle::Rounded => "msr",
            MaterialSymbolsStyle::Sharp => "mss",
        }
    }

    fn display_name(&self) -> &str {
        match self.style {
            MaterialSymbolsStyle::Outlined => "Google Material Symbols Outlined",
            MaterialSymbolsStyle::Rounded => "Google Material Symbols Rounded",
            MaterialSymbolsStyle::Sharp => "Google Material Symbols Sharp",
        }
    }

    async fn latest_version(&self, _http: &HttpCache) -> Result<String> {
        Ok("master".to_string())
    }

    fn download_urls(&self, version: &str) -> DownloadUrls {
        // Axis list in the file name is URL-encoded: [FILL,GRAD,opsz,wght]
        let base = format!(
            "{}/{}/{}/variablefont/{}%5BFILL,GRAD,opsz,wght%5D",
            self.raw_root,
            SYMBOLS_REPO,
            version,
            self.file_stem()
        );
        DownloadUrls {
            font: format!("{}.ttf", base),
            mapping: format!("{}.codepoints", base),
        }
    }

    fn process_mapping(&self, raw: &[u8]) -> Result<Mapping> {
        let text = utf8(self.name(), raw)?;
        let mapping = text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                let code_point = normalize_code_point(parts.next()?)?;
                Some((normalize_name(name).replace('_', "-"), code_point))
            })
            .collect();

        non_empty(self.name(), mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_mdi_css_mapping() {
        let css = r#"
.mdi:before,
.mdi-set {
  display: inline-block;
  font: normal normal normal 24px/1 "Material Design Icons";
}

.mdi-ab-testing::before {
  content: "\F01C9";
}

.mdi-home::before {
  content: "\F02DC";
}
"#;
        let mapping = MaterialDesign::new(&Endpoints::default())
            .process_mapping(css.as_bytes())
            .unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["home"], "0xf02dc");
        assert_eq!(mapping["ab-testing"], "0xf01c9");
    }

    #[test]
    fn test_mdi_empty_css_is_malformed() {
        let result = MaterialDesign::new(&Endpoints::default()).process_mapping(b".foo { color: red; }");
        assert!(matches!(result, Err(Error::MalformedMapping { .. })));
    }

    #[test]
    fn test_material_symbols_codepoints() {
        let codepoints = "10k e951\narrow_back e5c4\nhome e9b2\n\nbroken\nbad zz\n";
        let mapping = MaterialSymbols::new(MaterialSymbolsStyle::Rounded, &Endpoints::default())
            .process_mapping(codepoints.as_bytes())
            .unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping["home"], "0xe9b2");
        assert_eq!(mapping["arrow-back"], "0xe5c4");
        assert_eq!(mapping["10k"], "0xe951");
    }

    #[test]
    fn test_material_symbols_urls() {
        let urls = MaterialSymbols::new(MaterialSymbolsStyle::Sharp, &Endpoints::default()).download_urls("master");
        assert!(urls.font.ends_with("/variablefont/MaterialSymbolsSharp%5BFILL,GRAD,opsz,wght%5D.ttf"));
        assert!(urls.mapping.ends_with("MaterialSymbolsSharp%5BFILL,GRAD,opsz,wght%5D.codepoints"));
        assert!(urls.font.contains("/google/material-design-icons/master/"));
    }
}
