use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Full URL the host page loads the dynamic feed from.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Path fragment that identifies a feed request among all outgoing traffic.
    #[serde(default = "default_feed_path_fragment")]
    pub feed_path_fragment: String,
    /// 获取分组列表
    #[serde(default = "default_tags_url")]
    pub tags_url: String,
    /// 获取分组下的成员
    #[serde(default = "default_tag_members_url")]
    pub tag_members_url: String,
}

fn default_feed_url() -> String {
    "https://api.bilibili.com/x/polymer/web-dynamic/v1/feed/all?timezone_offset=-480&type=all&page=1".to_string()
}

fn default_feed_path_fragment() -> String {
    "polymer/web-dynamic/v1/feed/all".to_string()
}

fn default_tags_url() -> String {
    "https://api.bilibili.com/x/relation/tags".to_string()
}

fn default_tag_members_url() -> String {
    "https://api.bilibili.com/x/relation/tag".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            feed_path_fragment: default_feed_path_fragment(),
            tags_url: default_tags_url(),
            tag_members_url: default_tag_members_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Upper bound on feed pages requested for a single load while nothing matches.
    #[serde(default = "default_max_retry_pages")]
    pub max_retry_pages: u32,
    /// Consecutive exhausted empty loads before `has_more` is forced to false.
    #[serde(default = "default_max_empty_batches")]
    pub max_empty_batches: u32,
    /// JSON pointer from a feed item to its author id.
    #[serde(default = "default_author_pointer")]
    pub author_pointer: String,
}

fn default_max_retry_pages() -> u32 {
    10
}

fn default_max_empty_batches() -> u32 {
    3
}

fn default_author_pointer() -> String {
    "/modules/module_author/mid".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_retry_pages: default_max_retry_pages(),
            max_empty_batches: default_max_empty_batches(),
            author_pointer: default_author_pointer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Pause between member pages; keeps clear of the 412/429 rate limits.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

fn default_page_size() -> u32 {
    20
}

fn default_page_delay_ms() -> u64 {
    100
}

impl Default for MembersConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Raw `Cookie` header copied from a logged-in browser session
    /// (must contain `SESSDATA` and `DedeUserID`).
    #[serde(default)]
    pub cookie: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_referer")]
    pub referer: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "https://t.bilibili.com/".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub no_proxy: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            no_proxy: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub members: MembersConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn session_cookie(&self) -> Option<&str> {
        let cookie = self.session.cookie.trim();
        if cookie.is_empty() {
            None
        } else {
            Some(cookie)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_remote_limits() {
        let cfg = Config::default();
        assert_eq!(cfg.filter.max_retry_pages, 10);
        assert_eq!(cfg.filter.max_empty_batches, 3);
        assert_eq!(cfg.members.page_size, 20);
        assert_eq!(cfg.members.page_delay_ms, 100);
        assert!(cfg.api.feed_url.contains(&cfg.api.feed_path_fragment));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{
  "session": { "cookie": "SESSDATA=abc; DedeUserID=42" },
  "filter": { "maxRetryPages": 4 }
}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.filter.max_retry_pages, 4);
        assert_eq!(cfg.filter.max_empty_batches, 3);
        assert_eq!(cfg.session_cookie(), Some("SESSDATA=abc; DedeUserID=42"));
        assert!(!cfg.session.user_agent.is_empty());
    }

    #[test]
    fn test_empty_cookie_is_none() {
        let mut cfg = Config::default();
        cfg.session.cookie = "   ".to_string();
        assert_eq!(cfg.session_cookie(), None);
    }

    #[test]
    fn test_save_and_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().join("nested"));

        let fresh = Config::load_or_default(&paths).unwrap();
        assert_eq!(fresh.members.page_size, 20);

        let mut cfg = Config::default();
        cfg.members.page_size = 50;
        cfg.network.proxy = Some("http://127.0.0.1:7890".to_string());
        cfg.save(&paths.config_file()).unwrap();

        let loaded = Config::load_or_default(&paths).unwrap();
        assert_eq!(loaded.members.page_size, 50);
        assert_eq!(loaded.network.proxy.as_deref(), Some("http://127.0.0.1:7890"));
    }
}
