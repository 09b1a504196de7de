use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "NOMADNET_RELEASES_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Per-application sync configuration, read once at startup.
#[derive(Deserialize, Debug, Clone)]
pub struct SyncConfig {
    /// Repository in "owner/name" form
    pub github_repo: String,
    pub app_name: String,
    #[serde(default = "default_asset_pattern")]
    pub asset_pattern: String,
    #[serde(default = "default_max_releases")]
    pub max_releases: usize,
    #[serde(default)]
    pub app_description: String,
    pub page_title: Option<String>,
    pub ascii_art_file: Option<String>,
    pub ascii_bg_color: Option<String>,
}

fn default_asset_pattern() -> String {
    "*".to_string()
}

fn default_max_releases() -> usize {
    10
}

impl SyncConfig {
    /// Resolve the config file path: explicit override first, then the
    /// environment variable, then `config.json` in the working directory.
    pub fn resolve_path(override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load the config. A missing or malformed file is fatal for the run.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Title used on the generated download page.
    pub fn page_title(&self) -> String {
        self.page_title
            .clone()
            .unwrap_or_else(|| format!("{} Downloads", self.app_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"{"github_repo": "org/app", "app_name": "App"}"#,
        );

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.github_repo, "org/app");
        assert_eq!(config.asset_pattern, "*");
        assert_eq!(config.max_releases, 10);
        assert_eq!(config.page_title(), "App Downloads");
        assert!(config.ascii_art_file.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r##"{
                "github_repo": "org/app",
                "app_name": "App",
                "asset_pattern": "*.AppImage",
                "max_releases": 3,
                "app_description": "An app",
                "page_title": "Get App",
                "ascii_art_file": "art.txt",
                "ascii_bg_color": "#222222"
            }"##,
        );

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.asset_pattern, "*.AppImage");
        assert_eq!(config.max_releases, 3);
        assert_eq!(config.page_title(), "Get App");
        assert_eq!(config.ascii_art_file.as_deref(), Some("art.txt"));
        assert_eq!(config.ascii_bg_color.as_deref(), Some("#222222"));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = SyncConfig::load(&tmp.path().join("nope.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_required_key_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(tmp.path(), r#"{"app_name": "App"}"#);
        assert!(SyncConfig::load(&path).is_err());
    }

    #[test]
    fn test_resolve_path_prefers_override() {
        let resolved = SyncConfig::resolve_path(Some(Path::new("/etc/sync.json")));
        assert_eq!(resolved, Path::new("/etc/sync.json"));
    }

    // The only test touching CONFIG_ENV_VAR; keeps both branches in one
    // place so parallel tests never race on the variable.
    #[test]
    fn test_resolve_path_honors_env_var() {
        env::set_var(CONFIG_ENV_VAR, "/srv/releases/config.json");

        let resolved = SyncConfig::resolve_path(None);
        assert_eq!(resolved, Path::new("/srv/releases/config.json"));

        // An explicit override still wins over the environment
        let resolved = SyncConfig::resolve_path(Some(Path::new("/etc/sync.json")));
        assert_eq!(resolved, Path::new("/etc/sync.json"));

        env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(SyncConfig::resolve_path(None), Path::new("config.json"));
    }
}
