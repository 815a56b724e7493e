use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    error::{ContextExt, PosseErr},
    metadata::Platform,
    planner::Router,
};

pub const CONFIG_FILE: &str = "posse.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content directory, relative to the project directory.
    pub content_path: PathBuf,
    pub site_url: Url,
    /// Path segment between the site and the slug in a post URL.
    pub post_path_prefix: Arc<str>,
    pub platforms: Vec<Platform>,
    pub restricted_tags: Vec<Arc<str>>,
    pub restricted_platform: Platform,
    pub timeout_secs: u64,
    pub bluesky_service: Url,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_path: PathBuf::from("src/content/writing"),
            site_url: Url::parse("https://gvns.ca").expect("default site url to be valid"),
            post_path_prefix: Arc::from("/write/"),
            platforms: vec![Platform::Bluesky, Platform::Mastodon],
            restricted_tags: vec!["bjj".into(), "movement".into(), "training".into()],
            restricted_platform: Platform::Mastodon,
            timeout_secs: 30,
            bluesky_service: Url::parse("https://bsky.social")
                .expect("default bluesky service url to be valid"),
        }
    }
}

impl TryFrom<&Path> for Config {
    type Error = PosseErr;

    /// Reads `posse.yaml` from the project directory. Without one, defaults apply.
    fn try_from(value: &Path) -> Result<Self, PosseErr> {
        let config_path = value.join(CONFIG_FILE);
        if !config_path.exists() {
            debug!("no {CONFIG_FILE} in {}, using defaults", value.display());
            return Ok(Config::default());
        }
        let f = File::open(&config_path)
            .with_context(|| format!("config file: {}", config_path.display()))?;
        serde_yaml::from_reader(f).with_context(|| format!("config file: {}", config_path.display()))
    }
}

impl Config {
    pub fn router(&self) -> Router {
        Router::new(
            self.platforms.clone(),
            self.restricted_tags.iter().cloned(),
            self.restricted_platform,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::try_from(dir.path()).unwrap(), Config::default());
        assert_eq!(Config::default().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "site_url: https://example.com\nrestricted_tags: [cooking]\ntimeout_secs: 5\n",
        )
        .unwrap();
        let config = Config::try_from(dir.path()).unwrap();
        assert_eq!(config.site_url.as_str(), "https://example.com/");
        assert_eq!(config.restricted_tags, vec![Arc::<str>::from("cooking")]);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.content_path, PathBuf::from("src/content/writing"));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "platforms: [myspace]\n").unwrap();
        assert!(Config::try_from(dir.path()).is_err());
    }
}
