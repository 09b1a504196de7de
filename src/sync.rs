//! The sync pipeline
//!
//! One run mirrors a repository's releases into the NomadNet layout:
//! list releases, pick a stable and a prerelease candidate, download the
//! matching asset of each retained release, refresh the "latest" symlink,
//! and write `releases.json` for the node's pages to consume.
//!
//! Failure handling is tiered: an unusable config or an empty release list
//! aborts the run; everything per-release is logged and skipped; checksum
//! extraction is best-effort and never fails.

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::SyncConfig;
use crate::github::{ReleaseAsset, ReleaseDetails, ReleaseSource, ReleaseSummary};
use crate::install;
use crate::logging::{log_download, log_error, log_info, log_warning};
use crate::paths::Layout;

/// Summary file consumed by the hosting pages.
pub const RELEASES_JSON: &str = "releases.json";

/// Checksum sidecar files never count as the primary asset.
const CHECKSUM_SUFFIXES: [&str; 2] = [".sha256", ".md5"];

// ============================================================================
// Output Types
// ============================================================================

/// Display configuration echoed into `releases.json`.
#[derive(Serialize, Debug, Clone)]
pub struct ConfigSnapshot {
    pub app_name: String,
    pub app_description: String,
    pub page_title: String,
    /// Installed name of the ASCII art, when configured
    pub ascii_art_file: Option<String>,
    pub ascii_bg_color: Option<String>,
}

/// One synced release, augmented with the selected asset and its checksum.
#[derive(Serialize, Debug, Clone)]
pub struct ReleaseRecord {
    pub tag: String,
    pub name: String,
    /// Only present on `all_releases` entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_prerelease: Option<bool>,
    pub published_at: String,
    pub body: String,
    pub asset_filename: String,
    pub asset_size: u64,
    pub checksum: Option<String>,
}

/// Aggregate result of one sync run, serialized to [`RELEASES_JSON`].
#[derive(Serialize, Debug, Clone)]
pub struct SyncResult {
    pub config: ConfigSnapshot,
    pub last_sync: String,
    pub latest_stable: Option<ReleaseRecord>,
    pub latest_prerelease: Option<ReleaseRecord>,
    pub all_releases: Vec<ReleaseRecord>,
}

// ============================================================================
// Release Selection
// ============================================================================

/// Pick the stable release: the one the source flags as latest wins;
/// otherwise the first non-prerelease in returned order.
pub fn select_stable(releases: &[ReleaseSummary]) -> Option<&ReleaseSummary> {
    releases
        .iter()
        .find(|r| r.is_latest)
        .or_else(|| releases.iter().find(|r| !r.is_prerelease))
}

/// Pick the prerelease candidate: the first prerelease in returned order
/// whose tag differs from the stable tag. Source ordering is trusted as-is.
pub fn select_prerelease<'a>(
    releases: &'a [ReleaseSummary],
    stable_tag: Option<&str>,
) -> Option<&'a ReleaseSummary> {
    releases
        .iter()
        .find(|r| r.is_prerelease && Some(r.tag_name.as_str()) != stable_tag)
}

// ============================================================================
// Asset Matching & Checksums
// ============================================================================

/// First asset matching the pattern in list order, skipping checksum
/// sidecar files. The match is case-sensitive; no scoring is applied.
pub fn find_matching_asset<'a>(
    assets: &'a [ReleaseAsset],
    pattern: &glob::Pattern,
) -> Option<&'a ReleaseAsset> {
    assets.iter().find(|asset| {
        let name = asset.name.as_str();
        if CHECKSUM_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            return false;
        }
        pattern.matches(name)
    })
}

/// Best-effort scan of a release body for a SHA-256 digest belonging to
/// the named asset: a 64-hex token followed on the same line by the
/// asset's filename stem. No match is not an error.
pub fn extract_checksum(body: &str, filename: &str) -> Option<String> {
    let stem = Path::new(filename).file_stem()?.to_string_lossy();
    let pattern = format!(r"(?i)([a-f0-9]{{64}})\s+.*{}", regex::escape(&stem));
    let re = Regex::new(&pattern).ok()?;
    re.captures(body).map(|caps| caps[1].to_string())
}

// ============================================================================
// Downloads
// ============================================================================

/// Download an asset unless it is already present. An existing file counts
/// as downloaded; no integrity re-check is performed.
fn download_asset(
    source: &dyn ReleaseSource,
    repo: &str,
    tag: &str,
    asset: &ReleaseAsset,
    files_dir: &Path,
) -> bool {
    let filepath = files_dir.join(&asset.name);
    if filepath.exists() {
        log_info(&format!("Asset already exists: {}", asset.name));
        return true;
    }

    let size_mb = asset.size as f64 / 1024.0 / 1024.0;
    log_download(&format!("Downloading {} ({:.1} MB)", asset.name, size_mb));

    match source.download_asset(repo, tag, &asset.name, files_dir) {
        Ok(()) => {
            log_download(&format!("Successfully downloaded {}", asset.name));
            true
        }
        Err(e) => {
            log_error(&format!("Download failed: {}", e));
            false
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run one full sync. Returns the written [`SyncResult`] on success.
///
/// `asset_root` is the directory holding the bundled pages and ASCII art,
/// normally the config file's parent. Fatal errors (tier a) come back as
/// `Err`; per-release failures only shrink the output.
pub fn run(
    source: &dyn ReleaseSource,
    config: &SyncConfig,
    layout: &Layout,
    asset_root: &Path,
) -> Result<SyncResult, String> {
    log_info(&format!("Starting {} release sync", config.app_name));

    let pattern = glob::Pattern::new(&config.asset_pattern)
        .map_err(|e| format!("Invalid asset_pattern {:?}: {}", config.asset_pattern, e))?;

    layout
        .ensure_dirs()
        .map_err(|e| format!("Failed to create NomadNet directories: {}", e))?;

    install::install_pages(asset_root, config, layout);

    log_info(&format!("Fetching releases from {}", config.github_repo));
    // Twice the configured max leaves room for filtering prereleases out.
    let releases = source
        .list_releases(&config.github_repo, config.max_releases * 2)
        .unwrap_or_else(|e| {
            log_error(&format!("Error listing releases: {}", e));
            Vec::new()
        });
    if releases.is_empty() {
        return Err("Failed to fetch releases, aborting".to_string());
    }

    let stable_tag = select_stable(&releases).map(|r| r.tag_name.clone());
    let prerelease_tag =
        select_prerelease(&releases, stable_tag.as_deref()).map(|r| r.tag_name.clone());

    log_info(&format!("Latest stable: {:?}", stable_tag));
    log_info(&format!("Latest prerelease: {:?}", prerelease_tag));

    let mut result = SyncResult {
        config: ConfigSnapshot {
            app_name: config.app_name.clone(),
            app_description: config.app_description.clone(),
            page_title: config.page_title(),
            ascii_art_file: config
                .ascii_art_file
                .as_ref()
                .map(|_| install::ASCII_ART_NAME.to_string()),
            ascii_bg_color: config.ascii_bg_color.clone(),
        },
        last_sync: Utc::now().to_rfc3339(),
        latest_stable: None,
        latest_prerelease: None,
        all_releases: Vec::new(),
    };

    if let Some(tag) = &stable_tag {
        result.latest_stable = fetch_record(source, config, tag, &pattern, layout, false);
        if let Some(record) = &result.latest_stable {
            install::update_latest_symlink(
                &config.app_name,
                &record.asset_filename,
                &layout.files_dir,
            );
        }
    }

    if let Some(tag) = &prerelease_tag {
        result.latest_prerelease = fetch_record(source, config, tag, &pattern, layout, false);
    }

    for summary in releases.iter().take(config.max_releases) {
        if let Some(record) =
            fetch_record(source, config, &summary.tag_name, &pattern, layout, true)
        {
            result.all_releases.push(record);
        }
    }

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize release data: {}", e))?;
    let releases_path = layout.data_dir.join(RELEASES_JSON);
    fs::write(&releases_path, json)
        .map_err(|e| format!("Failed to write {}: {}", releases_path.display(), e))?;
    log_info(&format!("Wrote release data to {}", releases_path.display()));

    log_info("Sync complete");
    Ok(result)
}

/// Fetch, match and download one release. Any failure drops the release
/// from the output and keeps the run going.
fn fetch_record(
    source: &dyn ReleaseSource,
    config: &SyncConfig,
    tag: &str,
    pattern: &glob::Pattern,
    layout: &Layout,
    include_prerelease_flag: bool,
) -> Option<ReleaseRecord> {
    log_info(&format!("Fetching details for {}", tag));
    let details = match source.view_release(&config.github_repo, tag) {
        Ok(details) => details,
        Err(e) => {
            log_error(&format!("Failed to fetch details for {}: {}", tag, e));
            return None;
        }
    };

    let asset = match find_matching_asset(&details.assets, pattern) {
        Some(asset) => asset.clone(),
        None => {
            log_warning(&format!(
                "No asset matching {:?} in {}",
                config.asset_pattern, tag
            ));
            return None;
        }
    };

    if !download_asset(source, &config.github_repo, tag, &asset, &layout.files_dir) {
        return None;
    }

    Some(make_record(&details, &asset, include_prerelease_flag))
}

fn make_record(
    details: &ReleaseDetails,
    asset: &ReleaseAsset,
    include_prerelease_flag: bool,
) -> ReleaseRecord {
    ReleaseRecord {
        tag: details.tag_name.clone(),
        name: details.name.clone(),
        is_prerelease: include_prerelease_flag.then_some(details.is_prerelease),
        published_at: details.published_at.clone(),
        body: details.body.clone(),
        asset_filename: asset.name.clone(),
        asset_size: asset.size,
        checksum: extract_checksum(&details.body, &asset.name),
    }
}
