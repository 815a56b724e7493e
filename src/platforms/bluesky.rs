use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::PosseErr,
    metadata::Platform,
    platforms::{
        Outgoing, Publisher,
        facets::{Detected, Facet, Feature, detect},
        non_empty,
    },
    req::ensure_success,
};

const POST_COLLECTION: &str = "app.bsky.feed.post";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueskyCredentials {
    pub handle: String,
    pub app_password: String,
}

impl BlueskyCredentials {
    pub fn from_parts(handle: Option<String>, app_password: Option<String>) -> Option<Self> {
        Some(Self {
            handle: non_empty(handle)?,
            app_password: non_empty(app_password)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateSession<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct ResolvedHandle {
    did: String,
}

#[derive(Debug, Serialize)]
struct External<'a> {
    uri: &'a str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    #[serde(rename = "$type")]
    typ: &'static str,
    external: External<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    typ: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<Facet>,
    embed: Embed<'a>,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    uri: String,
}

/// Client for an AT protocol PDS, posting to `app.bsky.feed.post`.
pub struct Bluesky {
    client: reqwest::Client,
    service: Url,
    credentials: BlueskyCredentials,
}

impl Bluesky {
    pub fn new(client: reqwest::Client, service: Url, credentials: BlueskyCredentials) -> Self {
        Self {
            client,
            service,
            credentials,
        }
    }

    fn xrpc(&self, method: &str) -> Result<Url, PosseErr> {
        Ok(self.service.join(&format!("xrpc/{method}"))?)
    }

    async fn create_session(&self) -> Result<Session, PosseErr> {
        let response = self
            .client
            .post(self.xrpc("com.atproto.server.createSession")?)
            .json(&CreateSession {
                identifier: &self.credentials.handle,
                password: &self.credentials.app_password,
            })
            .send()
            .await?;
        Ok(ensure_success("bluesky", response).await?.json().await?)
    }

    async fn resolve_handle(&self, handle: &str) -> Result<String, PosseErr> {
        let response = self
            .client
            .get(self.xrpc("com.atproto.identity.resolveHandle")?)
            .query(&[("handle", handle)])
            .send()
            .await?;
        let resolved: ResolvedHandle = ensure_success("bluesky", response).await?.json().await?;
        Ok(resolved.did)
    }

    /// Turns detected ranges into facets. Mentions that do not resolve are left as plain text.
    async fn facets(&self, text: &str) -> Vec<Facet> {
        let mut facets = Vec::new();
        for detected in detect(text) {
            match detected {
                Detected::Link { range, uri } => {
                    facets.push(Facet::new(range, Feature::Link { uri }));
                }
                Detected::Tag { range, tag } => {
                    facets.push(Facet::new(range, Feature::Tag { tag }));
                }
                Detected::Mention { range, handle } => match self.resolve_handle(&handle).await {
                    Ok(did) => facets.push(Facet::new(range, Feature::Mention { did })),
                    Err(e) => warn!("could not resolve mention @{handle}: {e}"),
                },
            }
        }
        facets
    }
}

/// `at://{did}/app.bsky.feed.post/{rkey}` to `https://bsky.app/profile/{handle}/post/{rkey}`.
pub fn post_url(handle: &str, at_uri: &str) -> Result<Url, PosseErr> {
    let rest = at_uri
        .strip_prefix("at://")
        .ok_or_else(|| PosseErr::Other(format!("not an at:// uri: {at_uri}")))?;
    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        [_, collection, rkey] if *collection == POST_COLLECTION && !rkey.is_empty() => Ok(
            Url::parse(&format!("https://bsky.app/profile/{handle}/post/{rkey}"))?,
        ),
        _ => Err(PosseErr::Other(format!("unexpected post uri: {at_uri}"))),
    }
}

#[async_trait]
impl Publisher for Bluesky {
    fn platform(&self) -> Platform {
        Platform::Bluesky
    }

    async fn publish(&self, outgoing: &Outgoing) -> Result<Url, PosseErr> {
        let session = self.create_session().await?;
        debug!("bluesky session created for {}", session.did);

        let facets = self.facets(&outgoing.text).await;
        let request = CreateRecord {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord {
                typ: POST_COLLECTION,
                text: &outgoing.text,
                facets,
                embed: Embed {
                    typ: "app.bsky.embed.external",
                    external: External {
                        uri: outgoing.url.as_str(),
                        title: &outgoing.title,
                        description: &outgoing.description,
                    },
                },
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        };

        let response = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord")?)
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await?;
        let created: CreatedRecord = ensure_success("bluesky", response).await?.json().await?;
        post_url(&session.handle, &created.uri)
    }
}
