pub mod bluesky;
pub mod facets;
pub mod mastodon;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::{config::Config, error::PosseErr, metadata::Platform, req::get_client};

pub use bluesky::{Bluesky, BlueskyCredentials};
pub use mastodon::{Mastodon, MastodonCredentials};

/// What gets announced for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub text: String,
    pub title: Arc<str>,
    pub description: Arc<str>,
    pub url: Url,
}

/// A platform client able to create a post and return its canonical, browsable URL.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn publish(&self, outgoing: &Outgoing) -> Result<Url, PosseErr>;
}

pub type Publishers = HashMap<Platform, Box<dyn Publisher>>;

/// Builds a publisher for every platform whose credentials are complete.
pub fn init_publishers(
    config: &Config,
    bluesky: Option<BlueskyCredentials>,
    mastodon: Option<MastodonCredentials>,
) -> Result<Publishers, PosseErr> {
    let client = get_client(config.timeout())?;
    let mut publishers: Vec<Box<dyn Publisher>> = Vec::new();
    if let Some(credentials) = bluesky {
        debug!("bluesky credentials found for {}", credentials.handle);
        publishers.push(Box::new(Bluesky::new(
            client.clone(),
            config.bluesky_service.clone(),
            credentials,
        )));
    }
    if let Some(credentials) = mastodon {
        debug!("mastodon credentials found for {}", credentials.instance);
        publishers.push(Box::new(Mastodon::new(client, credentials)));
    }
    Ok(publishers
        .into_iter()
        .map(|publisher| (publisher.platform(), publisher))
        .collect())
}

/// Empty and whitespace-only values count as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
