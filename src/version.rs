//! `--version` handling: compare the installed version with the release index.

use std::fmt;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

pub const CRATES_IO_API: &str = "https://crates.io/api/v1/crates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionStatus {
    UpToDate,
    OutOfDate,
    PreRelease,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::UpToDate => "up-to-date",
            VersionStatus::OutOfDate => "out-of-date",
            VersionStatus::PreRelease => "pre-release",
        }
    }

    fn article(&self) -> &'static str {
        match self {
            VersionStatus::OutOfDate | VersionStatus::UpToDate => "an",
            VersionStatus::PreRelease => "a",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    pub installed: String,
    /// Newest published release, `None` when the index lists nothing.
    pub latest: Option<String>,
    pub status: VersionStatus,
}

impl VersionReport {
    pub fn latest_display(&self) -> &str {
        self.latest.as_deref().unwrap_or("N/A")
    }
}

impl fmt::Display for VersionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Installed version : {}\nLatest version    : {}\n\nYou are running {} {} version of ManageIQ CLI!",
            self.installed,
            self.latest_display(),
            self.status.article(),
            self.status.as_str()
        )
    }
}

/// Classify `local` against `published` (newest first, index order trusted).
///
/// First entry → up to date, any later entry → out of date, absent →
/// pre-release. `latest` only depends on whether the list is empty.
pub fn classify(local: &str, published: &[String]) -> VersionReport {
    let status = match published.iter().position(|v| v == local) {
        Some(0) => VersionStatus::UpToDate,
        Some(_) => VersionStatus::OutOfDate,
        None => VersionStatus::PreRelease,
    };
    VersionReport {
        installed: local.to_string(),
        latest: published.first().cloned(),
        status,
    }
}

/// Source of published release identifiers for a package.
pub trait ReleaseIndex {
    fn releases(&self, package: &str) -> Result<Vec<String>>;
}

/// crates.io registry API.
pub struct CratesIoIndex {
    base: String,
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(default)]
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    #[serde(default)]
    yanked: bool,
}

impl CratesIoIndex {
    pub fn new() -> Self {
        CratesIoIndex {
            base: CRATES_IO_API.to_string(),
        }
    }

    async fn fetch(&self, package: &str) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/{}", self.base, package);
        let client = reqwest::Client::builder()
            .user_agent(concat!("miqcli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let resp = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body: CrateResponse = resp
            .error_for_status()
            .context("release index returned an error")?
            .json()
            .await
            .context("release index returned malformed JSON")?;
        Ok(published_versions(body))
    }
}

impl Default for CratesIoIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn published_versions(body: CrateResponse) -> Vec<String> {
    body.versions
        .into_iter()
        .filter(|v| !v.yanked)
        .map(|v| v.num)
        .collect()
}

impl ReleaseIndex for CratesIoIndex {
    fn releases(&self, package: &str) -> Result<Vec<String>> {
        let rt = tokio::runtime::Runtime::new()
            .context("Failed to create Tokio runtime")
            .map_err(CliError::remote)?;
        rt.block_on(self.fetch(package)).map_err(CliError::remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn newest_release_is_up_to_date() {
        let r = classify("1.2.0", &list(&["1.2.0", "1.1.0"]));
        assert_eq!(r.status, VersionStatus::UpToDate);
        assert_eq!(r.latest_display(), "1.2.0");
    }

    #[test]
    fn older_release_is_out_of_date() {
        let r = classify("1.1.0", &list(&["1.2.0", "1.1.0"]));
        assert_eq!(r.status, VersionStatus::OutOfDate);
        assert_eq!(r.latest_display(), "1.2.0");
    }

    #[test]
    fn unpublished_version_is_pre_release() {
        let r = classify("0.9.0-dev", &list(&["1.2.0", "1.1.0"]));
        assert_eq!(r.status, VersionStatus::PreRelease);
        assert_eq!(r.latest_display(), "1.2.0");
    }

    #[test]
    fn empty_index_reports_not_available() {
        let r = classify("1.0.0", &[]);
        assert_eq!(r.status, VersionStatus::PreRelease);
        assert_eq!(r.latest, None);
        assert_eq!(r.latest_display(), "N/A");
    }

    #[test]
    fn message_layout() {
        let r = classify("1.1.0", &list(&["1.2.0", "1.1.0"]));
        assert_eq!(
            r.to_string(),
            "Installed version : 1.1.0\nLatest version    : 1.2.0\n\nYou are running an out-of-date version of ManageIQ CLI!"
        );
        let r = classify("0.1.0", &[]);
        assert!(r.to_string().ends_with("running a pre-release version of ManageIQ CLI!"));
    }

    #[test]
    fn yanked_versions_are_skipped() {
        let body: CrateResponse = serde_json::from_str(
            r#"{"versions":[{"num":"0.3.0","yanked":true},{"num":"0.2.0"},{"num":"0.1.0","yanked":false}]}"#,
        )
        .unwrap();
        assert_eq!(published_versions(body), ["0.2.0", "0.1.0"]);
    }
}
