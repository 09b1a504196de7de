//! GitHub release source
//!
//! All GitHub access is delegated to the `gh` CLI, which owns
//! authentication and the API protocol; this module only launches it and
//! parses its `--json` output. The [`ReleaseSource`] trait keeps the sync
//! pipeline independent of the hosting platform.

use serde::Deserialize;
use std::error::Error;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Timeout for metadata calls (`release list` / `release view`)
const METADATA_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for asset downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

const LIST_FIELDS: &str = "tagName,name,isPrerelease,publishedAt,isLatest";
const VIEW_FIELDS: &str = "tagName,name,body,isPrerelease,publishedAt,assets";

// ============================================================================
// Release Metadata Types
// ============================================================================

/// One row of `gh release list`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    pub tag_name: String,
    pub name: String,
    #[serde(default)]
    pub is_prerelease: bool,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub is_latest: bool,
}

/// Full release metadata from `gh release view`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDetails {
    pub tag_name: String,
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_prerelease: bool,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Downloadable file attached to a release
#[derive(Deserialize, Debug, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

// ============================================================================
// Release Source
// ============================================================================

/// Where release metadata and assets come from.
///
/// The pipeline only talks to this trait, so a different hosting platform
/// can be plugged in without touching the orchestration logic.
pub trait ReleaseSource {
    /// List up to `limit` releases, newest first per the source's ordering.
    fn list_releases(
        &self,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<ReleaseSummary>, Box<dyn Error>>;

    /// Fetch full metadata for a single release.
    fn view_release(&self, repo: &str, tag: &str) -> Result<ReleaseDetails, Box<dyn Error>>;

    /// Download one named asset of a release into `dest_dir`.
    fn download_asset(
        &self,
        repo: &str,
        tag: &str,
        asset_name: &str,
        dest_dir: &Path,
    ) -> Result<(), Box<dyn Error>>;
}

/// Release source backed by the `gh` CLI.
pub struct GhCli;

impl GhCli {
    /// Run `gh` with the given arguments, enforcing a timeout, and return
    /// its stdout on success.
    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, Box<dyn Error>> {
        let mut child = Command::new("gh")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on threads so a chatty child can't block on a
        // full pipe buffer while we wait on it.
        let mut stdout_pipe = child.stdout.take().ok_or("Failed to capture gh stdout")?;
        let mut stderr_pipe = child.stderr.take().ok_or("Failed to capture gh stderr")?;
        let stdout_thread = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout_pipe.read_to_string(&mut buf);
            buf
        });
        let stderr_thread = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf);
            buf
        });

        let status = match child.wait_timeout(timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!(
                    "gh {} timed out after {} seconds",
                    args.join(" "),
                    timeout.as_secs()
                )
                .into());
            }
        };

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        if !status.success() {
            return Err(format!("gh {} failed: {}", args.join(" "), stderr.trim()).into());
        }

        Ok(stdout)
    }
}

impl ReleaseSource for GhCli {
    fn list_releases(
        &self,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<ReleaseSummary>, Box<dyn Error>> {
        let limit = limit.to_string();
        let stdout = self.run(
            &[
                "release", "list", "--repo", repo, "--json", LIST_FIELDS, "--limit", &limit,
            ],
            METADATA_TIMEOUT,
        )?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn view_release(&self, repo: &str, tag: &str) -> Result<ReleaseDetails, Box<dyn Error>> {
        let stdout = self.run(
            &["release", "view", tag, "--repo", repo, "--json", VIEW_FIELDS],
            METADATA_TIMEOUT,
        )?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn download_asset(
        &self,
        repo: &str,
        tag: &str,
        asset_name: &str,
        dest_dir: &Path,
    ) -> Result<(), Box<dyn Error>> {
        let dir = dest_dir.display().to_string();
        self.run(
            &[
                "release", "download", tag, "--repo", repo, "--pattern", asset_name, "--dir",
                &dir,
            ],
            DOWNLOAD_TIMEOUT,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_list_output() {
        let json = r#"[
            {
                "tagName": "v1.2.0",
                "name": "Release 1.2.0",
                "isPrerelease": false,
                "publishedAt": "2026-05-01T12:00:00Z",
                "isLatest": true
            },
            {
                "tagName": "v1.3.0-rc1",
                "name": "1.3.0 RC1",
                "isPrerelease": true,
                "publishedAt": "2026-05-10T12:00:00Z",
                "isLatest": false
            }
        ]"#;

        let releases: Vec<ReleaseSummary> = serde_json::from_str(json).unwrap();
        assert_eq!(releases.len(), 2);
        assert!(releases[0].is_latest);
        assert!(!releases[0].is_prerelease);
        assert!(releases[1].is_prerelease);
        assert_eq!(releases[1].tag_name, "v1.3.0-rc1");
    }

    #[test]
    fn test_parse_release_view_output() {
        let json = r#"{
            "tagName": "v1.2.0",
            "name": "Release 1.2.0",
            "body": "Notes",
            "isPrerelease": false,
            "publishedAt": "2026-05-01T12:00:00Z",
            "assets": [
                {"name": "app-1.2.0.AppImage", "size": 1048576},
                {"name": "app-1.2.0.AppImage.sha256", "size": 98}
            ]
        }"#;

        let details: ReleaseDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.assets.len(), 2);
        assert_eq!(details.assets[0].size, 1048576);
    }

    #[test]
    fn test_parse_view_output_without_body_or_assets() {
        let json = r#"{
            "tagName": "v0.1.0",
            "name": "First",
            "isPrerelease": false,
            "publishedAt": "2026-01-01T00:00:00Z"
        }"#;

        let details: ReleaseDetails = serde_json::from_str(json).unwrap();
        assert!(details.body.is_empty());
        assert!(details.assets.is_empty());
    }
}
