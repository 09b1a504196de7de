//! NomadNet directory layout
//!
//! Everything the sync produces lands under `~/.nomadnetwork`. The layout is
//! a plain struct rather than hard-coded globals so the pipeline can be
//! pointed at a scratch directory in tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub static DEFAULT_NOMADNET_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    let mut path = dirs::home_dir().unwrap_or_default();
    path.push(".nomadnetwork");
    path
});

/// The three NomadNet directories a sync run writes into.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Receives `releases.json`
    pub data_dir: PathBuf,
    /// Receives downloaded assets and the "latest" symlink
    pub files_dir: PathBuf,
    /// Receives copied static pages
    pub pages_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self::under(DEFAULT_NOMADNET_PATH.as_path())
    }
}

impl Layout {
    /// Layout rooted at an arbitrary directory, mirroring the structure
    /// NomadNet expects under its home folder.
    pub fn under(root: &Path) -> Self {
        Self {
            data_dir: root.join("data"),
            files_dir: root.join("storage").join("files"),
            pages_dir: root.join("storage").join("pages"),
        }
    }

    /// Create all three directories if they are missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.files_dir)?;
        fs::create_dir_all(&self.pages_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let layout = Layout::under(Path::new("/tmp/nn"));
        assert_eq!(layout.data_dir, Path::new("/tmp/nn/data"));
        assert_eq!(layout.files_dir, Path::new("/tmp/nn/storage/files"));
        assert_eq!(layout.pages_dir, Path::new("/tmp/nn/storage/pages"));
    }

    #[test]
    fn test_ensure_dirs_creates_all() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = Layout::under(tmp.path());
        layout.ensure_dirs().unwrap();
        assert!(layout.data_dir.is_dir());
        assert!(layout.files_dir.is_dir());
        assert!(layout.pages_dir.is_dir());
    }
}
