use std::{fmt::Display, str::FromStr, sync::Arc};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::PosseErr;

/// Social platform a post can be syndicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bluesky,
    Mastodon,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Bluesky => "bluesky",
            Platform::Mastodon => "mastodon",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PosseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bluesky" => Ok(Platform::Bluesky),
            "mastodon" => Ok(Platform::Mastodon),
            other => Err(format!("Unknown platform: {other}").into()),
        }
    }
}

/// Proof that a post was published to a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyndicationRecord {
    pub platform: Platform,
    pub url: String,
    #[serde(
        rename = "syndicatedAt",
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_date"
    )]
    pub syndicated_at: NaiveDate,
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}

// Older records were written by tools that dump dates as full timestamps.
fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| serde::de::Error::custom(format!("invalid syndicatedAt date: {raw}")))
}

/// The front-matter fields syndication reads. Every other field is carried
/// untouched by [`crate::frontmatter::Document`].
#[derive(Debug, PartialEq, Default, Clone, Deserialize)]
pub struct Metadata {
    pub title: Arc<str>,
    #[serde(default)]
    pub description: Option<Arc<str>>,
    #[serde(default)]
    pub tags: Option<Vec<Arc<str>>>,
    #[serde(default)]
    pub draft: Option<bool>,
    /// Kept raw so records written by other tools, or for platforms this crate
    /// does not post to, never make the post unreadable.
    #[serde(default)]
    pub syndication: Option<Vec<Value>>,
}

impl Metadata {
    /// Platforms that already have a record, in record order. Records for unknown
    /// platforms are ignored. A malformed record still counts for the platform it names.
    pub fn syndicated_platforms(&self) -> Vec<Platform> {
        let mut platforms = Vec::new();
        for raw in self.syndication.iter().flatten() {
            let Some(name) = raw.get("platform").and_then(Value::as_str) else {
                warn!(title = %self.title, "ignoring syndication record without a platform: {raw:?}");
                continue;
            };
            let platform = match name.parse::<Platform>() {
                Ok(platform) => platform,
                Err(e) => {
                    debug!(title = %self.title, "{e}, ignoring its syndication record");
                    continue;
                }
            };
            if let Err(e) = serde_yaml::from_value::<SyndicationRecord>(raw.clone()) {
                warn!(title = %self.title, %platform, "malformed syndication record: {e}");
            }
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        platforms
    }
}
