//! Static file installation and the "latest" symlink
//!
//! Copies bundled presentation pages into the NomadNet pages directory and
//! keeps the stable-release alias in the files directory pointing at the
//! current stable asset.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::config::SyncConfig;
use crate::logging::{log_error, log_info, log_warning};
use crate::paths::Layout;

/// Name the configured ASCII art is installed under in the pages dir.
pub const ASCII_ART_NAME: &str = "ascii-art.txt";

// ============================================================================
// Page Installation
// ============================================================================

/// Install static pages bundled next to the config file.
///
/// Files from `<asset_root>/pages/` are copied into the pages directory;
/// `.mu` pages are made executable so NomadNet serves them as dynamic
/// pages. The configured ASCII art file, if any, is installed as
/// [`ASCII_ART_NAME`]. All failures are logged and non-fatal.
pub fn install_pages(asset_root: &Path, config: &SyncConfig, layout: &Layout) {
    let pages_src = asset_root.join("pages");
    if pages_src.is_dir() {
        match fs::read_dir(&pages_src) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let src = entry.path();
                    if !src.is_file() {
                        continue;
                    }
                    install_page(&src, &layout.pages_dir);
                }
            }
            Err(e) => {
                log_warning(&format!(
                    "Failed to read pages directory {}: {}",
                    pages_src.display(),
                    e
                ));
            }
        }
    }

    if let Some(art_file) = &config.ascii_art_file {
        let src = asset_root.join(art_file);
        let dst = layout.pages_dir.join(ASCII_ART_NAME);
        if src.exists() {
            match fs::copy(&src, &dst) {
                Ok(_) => log_info(&format!("Installed ASCII art to {}", dst.display())),
                Err(e) => log_error(&format!("Failed to install ASCII art: {}", e)),
            }
        }
    }
}

fn install_page(src: &Path, pages_dir: &Path) {
    let name = match src.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return,
    };
    let dst = pages_dir.join(&name);

    if let Err(e) = fs::copy(src, &dst) {
        log_error(&format!("Failed to install {}: {}", name, e));
        return;
    }

    // .mu pages are micron scripts and must be executable
    if src.extension().and_then(|ext| ext.to_str()) == Some("mu") {
        if let Err(e) = set_executable(&dst) {
            log_warning(&format!("Failed to mark {} executable: {}", name, e));
        }
    }

    log_info(&format!("Installed {}", name));
}

fn set_executable(path: &Path) -> std::io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

// ============================================================================
// Latest Symlink
// ============================================================================

/// Point the stable alias at the newest stable asset.
///
/// The link lives in the files directory under
/// `<app_name lowercased>-latest<ext>` and targets the asset's bare
/// filename. A stale link (or a leftover regular file) at the alias path
/// is replaced; if the asset itself is missing, no link is created.
pub fn update_latest_symlink(app_name: &str, stable_filename: &str, files_dir: &Path) {
    let suffix = Path::new(stable_filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let symlink_name = format!("{}-latest{}", app_name.to_lowercase(), suffix);
    let symlink_path = files_dir.join(&symlink_name);

    if symlink_path.is_symlink() || symlink_path.exists() {
        let _ = fs::remove_file(&symlink_path);
    }

    let target_path = files_dir.join(stable_filename);
    if !target_path.exists() {
        return;
    }

    match std::os::unix::fs::symlink(stable_filename, &symlink_path) {
        Ok(()) => log_info(&format!(
            "Updated symlink: {} -> {}",
            symlink_name, stable_filename
        )),
        Err(e) => log_error(&format!("Failed to update symlink {}: {}", symlink_name, e)),
    }
}
