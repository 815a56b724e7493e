use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::PosseErr,
    metadata::Platform,
    platforms::{Outgoing, Publisher, non_empty},
    req::ensure_success,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MastodonCredentials {
    pub instance: Url,
    pub token: String,
}

impl MastodonCredentials {
    pub fn from_parts(
        instance: Option<String>,
        token: Option<String>,
    ) -> Result<Option<Self>, PosseErr> {
        let (Some(instance), Some(token)) = (non_empty(instance), non_empty(token)) else {
            return Ok(None);
        };
        Ok(Some(Self {
            instance: Url::parse(instance.trim())?,
            token,
        }))
    }
}

#[derive(Debug, Serialize)]
struct CreateStatus<'a> {
    status: &'a str,
    visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct Status {
    uri: Option<String>,
    url: Option<String>,
}

pub struct Mastodon {
    client: reqwest::Client,
    credentials: MastodonCredentials,
}

impl Mastodon {
    pub fn new(client: reqwest::Client, credentials: MastodonCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl Publisher for Mastodon {
    fn platform(&self) -> Platform {
        Platform::Mastodon
    }

    async fn publish(&self, outgoing: &Outgoing) -> Result<Url, PosseErr> {
        let response = self
            .client
            .post(self.credentials.instance.join("api/v1/statuses")?)
            .bearer_auth(&self.credentials.token)
            // The instance drops repeated requests carrying the same key for an hour.
            .header("Idempotency-Key", format!("posse:{}", outgoing.url))
            .json(&CreateStatus {
                status: &outgoing.text,
                visibility: "public",
            })
            .send()
            .await?;
        let status: Status = ensure_success("mastodon", response).await?.json().await?;
        let url = status
            .url
            .or(status.uri)
            .ok_or_else(|| PosseErr::Other("mastodon status has no url".into()))?;
        Ok(Url::parse(&url)?)
    }
}
