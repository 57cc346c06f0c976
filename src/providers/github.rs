//! Version lookups against the GitHub REST API.

use crate::error::{Error, Result};
use crate::http_cache::HttpCache;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Tag name of the latest published release of `repo` (`owner/name`).
pub(crate) async fn latest_release(http: &HttpCache, api_root: &str, repo: &str) -> Result<String> {
    let url = format!("{}/repos/{}/releases/latest", api_root, repo);
    let release: Release = http.get_json(&url, &[], http.ttl()).await?;
    Ok(strip_v(&release.tag_name))
}

/// Most recent tag of `repo`; the tags endpoint lists newest first.
pub(crate) async fn latest_tag(http: &HttpCache, api_root: &str, repo: &str) -> Result<String> {
    let url = format!("{}/repos/{}/tags", api_root, repo);
    let tags: Vec<Tag> = http.get_json(&url, &[], http.ttl()).await?;
    tags.into_iter()
        .next()
        .map(|tag| strip_v(&tag.name))
        .ok_or_else(|| Error::unexpected(&url, "repository has no tags"))
}

fn strip_v(tag: &str) -> String {
    tag.trim_start_matches('v').to_string()
}
