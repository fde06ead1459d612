//! Heritage Wiki Config

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_SITES_URL: &str = "https://whc.unesco.org/en/list/xml/";
pub const DEFAULT_WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_TRANSLATION_API_URL: &str = "https://www.wikidata.org/w/api.php";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of every cache file and the log
    pub data_dir: PathBuf,
    /// UNESCO site list endpoint
    pub sites_url: String,
    /// MediaWiki action API endpoint
    pub wiki_api_url: String,
    /// Cross-language link service endpoint
    pub translation_api_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sites_url: DEFAULT_SITES_URL.to_string(),
            wiki_api_url: DEFAULT_WIKI_API_URL.to_string(),
            translation_api_url: DEFAULT_TRANSLATION_API_URL.to_string(),
            user_agent: format!(
                "heritage-wiki/{} (World Heritage Site scraper)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    pub fn with_sites_url(mut self, url: impl Into<String>) -> Self {
        self.sites_url = url.into();
        self
    }

    pub fn with_wiki_api_url(mut self, url: impl Into<String>) -> Self {
        self.wiki_api_url = url.into();
        self
    }

    pub fn with_translation_api_url(mut self, url: impl Into<String>) -> Self {
        self.translation_api_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the path to the cached UNESCO XML
    pub fn sites_path(&self) -> PathBuf {
        self.data_dir.join("whc-sites.xml")
    }

    /// Directory holding one JSON file per article
    pub fn markup_dir(&self) -> PathBuf {
        self.data_dir.join("wiki")
    }

    pub fn markup_path(&self, title: &str) -> PathBuf {
        self.markup_dir().join(format!("{}.json", cache_key(title)))
    }

    pub fn translations_dir(&self) -> PathBuf {
        self.data_dir.join("translations")
    }

    pub fn translation_path(&self, title: &str) -> PathBuf {
        self.translations_dir().join(format!("{}.json", cache_key(title)))
    }

    /// Get the path to the merged region title index
    pub fn titles_path(&self) -> PathBuf {
        self.data_dir.join("article_titles.json")
    }

    /// Get the path to the site/article/id links
    pub fn links_path(&self) -> PathBuf {
        self.data_dir.join("site_links.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("heritage-wiki.log")
    }

    /// Get the path to config file
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = self.config_path();
        std::fs::create_dir_all(&self.data_dir).map_err(|e| Error::io(&self.data_dir, e))?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        Ok(())
    }

    /// Resolve the config for a run.
    ///
    /// An explicit `config_file` must exist. Otherwise `<data_dir>/config.json`
    /// is read when present, falling back to defaults. `data_dir` replaces the
    /// file's data directory only when given.
    pub fn locate(config_file: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::load(path)?,
            None => {
                let base = match data_dir {
                    Some(dir) => Self::new().with_data_dir(dir),
                    None => Self::new(),
                };
                let path = base.config_path();
                if path.is_file() {
                    Self::load(&path)?
                } else {
                    base
                }
            }
        };

        Ok(match data_dir {
            Some(dir) => config.with_data_dir(dir),
            None => config,
        })
    }

    /// Load config from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// File name stem for a title: spaces become underscores, slashes are escaped
pub fn cache_key(title: &str) -> String {
    title.trim().replace(' ', "_").replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("Tower of London"), "Tower_of_London");
        assert_eq!(cache_key("AC/DC"), "AC%2FDC");
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = Config::new().with_data_dir("/tmp/whs");
        assert_eq!(config.sites_path(), PathBuf::from("/tmp/whs/whc-sites.xml"));
        assert_eq!(
            config.markup_path("Old Town of Lijiang"),
            PathBuf::from("/tmp/whs/wiki/Old_Town_of_Lijiang.json")
        );
        assert_eq!(
            config.translation_path("Petra"),
            PathBuf::from("/tmp/whs/translations/Petra.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new()
            .with_data_dir(dir.path())
            .with_timeout_secs(5);
        config.save().unwrap();

        let loaded = Config::load(config.config_path()).unwrap();
        assert_eq!(loaded.timeout_secs, 5);
        assert_eq!(loaded.data_dir, dir.path());
        assert_eq!(loaded.sites_url, DEFAULT_SITES_URL);
    }

    #[test]
    fn test_locate_keeps_file_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/whs", "timeout_secs": 7}"#).unwrap();

        let config = Config::locate(Some(&path), None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/whs"));
        assert_eq!(config.timeout_secs, 7);

        let config = Config::locate(Some(&path), Some(dir.path())).unwrap();
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn test_locate_reads_config_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        Config::new()
            .with_data_dir(dir.path())
            .with_wiki_api_url("http://localhost/w/api.php")
            .save()
            .unwrap();

        let config = Config::locate(None, Some(dir.path())).unwrap();
        assert_eq!(config.wiki_api_url, "http://localhost/w/api.php");
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_locate_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::locate(None, Some(dir.path())).unwrap();
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.sites_url, DEFAULT_SITES_URL);

        let missing = dir.path().join("missing.json");
        assert!(Config::locate(Some(&missing), None).is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"timeout_secs": 10}"#).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}
