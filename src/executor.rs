use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::PosseErr,
    frontmatter::RecordStore,
    metadata::{Platform, SyndicationRecord},
    planner::Plan,
    platforms::{Outgoing, Publishers},
    posts::Post,
    render::render_text,
};

const PERSIST_ATTEMPTS: u32 = 3;

/// Result of one (post, platform) attempt.
#[derive(Debug)]
pub enum Outcome {
    /// Dry run: the text that would have been posted.
    DryRun { text: String },
    /// No credentials for the platform. Still pending.
    Skipped,
    /// The platform call failed. Still pending.
    Failed(PosseErr),
    /// Posted and recorded.
    Syndicated { url: Url },
    /// Posted, but the record could not be written. Needs manual reconciliation,
    /// otherwise the next run posts again.
    Unrecorded { url: Url, error: PosseErr },
}

#[derive(Debug)]
pub struct Attempt {
    pub platform: Platform,
    pub outcome: Outcome,
}

pub struct Executor {
    publishers: Publishers,
    store: Box<dyn RecordStore>,
    site_url: Url,
    post_path_prefix: Arc<str>,
    dry_run: bool,
    persist_backoff: Duration,
}

impl Executor {
    pub fn new(
        publishers: Publishers,
        store: Box<dyn RecordStore>,
        site_url: Url,
        post_path_prefix: Arc<str>,
        dry_run: bool,
    ) -> Self {
        Self {
            publishers,
            store,
            site_url,
            post_path_prefix,
            dry_run,
            persist_backoff: Duration::from_millis(250),
        }
    }

    pub fn with_persist_backoff(mut self, backoff: Duration) -> Self {
        self.persist_backoff = backoff;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn post_url(&self, post: &Post) -> Result<Url, PosseErr> {
        post.url(&self.site_url, &self.post_path_prefix)
    }

    pub fn outgoing(&self, post: &Post) -> Result<Outgoing, PosseErr> {
        let url = self.post_url(post)?;
        Ok(Outgoing {
            text: render_text(&post.title, &post.description, url.as_str(), &post.tags),
            title: post.title.clone(),
            description: post.description.clone(),
            url,
        })
    }

    /// Attempts every missing platform of `plan` in order. A failure on one
    /// platform never stops the next one.
    pub async fn execute(&self, plan: &Plan) -> Vec<Attempt> {
        let outgoing = match self.outgoing(&plan.post) {
            Ok(outgoing) => outgoing,
            Err(e) => {
                error!(slug = %plan.post.slug, "cannot build post url: {e}");
                return plan
                    .missing
                    .iter()
                    .map(|platform| Attempt {
                        platform: *platform,
                        outcome: Outcome::Failed(PosseErr::Other(e.to_string())),
                    })
                    .collect();
            }
        };

        let mut attempts = Vec::with_capacity(plan.missing.len());
        for platform in &plan.missing {
            let outcome = self.execute_one(&plan.post, &outgoing, *platform).await;
            attempts.push(Attempt {
                platform: *platform,
                outcome,
            });
        }
        attempts
    }

    async fn execute_one(&self, post: &Post, outgoing: &Outgoing, platform: Platform) -> Outcome {
        if self.dry_run {
            info!(slug = %post.slug, %platform, "[dry run] would post to {platform}");
            return Outcome::DryRun {
                text: outgoing.text.clone(),
            };
        }

        let Some(publisher) = self.publishers.get(&platform) else {
            warn!(slug = %post.slug, %platform, "skipping {platform}: missing credentials");
            return Outcome::Skipped;
        };

        info!(slug = %post.slug, %platform, "posting to {platform}");
        let url = match publisher.publish(outgoing).await {
            Ok(url) => url,
            Err(e) => {
                error!(slug = %post.slug, %platform, "failed to post to {platform}: {e}");
                return Outcome::Failed(e);
            }
        };
        info!(slug = %post.slug, %platform, %url, "posted to {platform}");

        let record = SyndicationRecord {
            platform,
            url: url.to_string(),
            syndicated_at: today(),
        };
        match self.persist(post, &record).await {
            Ok(()) => Outcome::Syndicated { url },
            Err(e) => {
                error!(
                    slug = %post.slug,
                    %platform,
                    %url,
                    path = %post.path.display(),
                    "POSTED BUT NOT RECORDED: add this {platform} url to the post's syndication list by hand, \
                     or the next run will post it again: {e}"
                );
                Outcome::Unrecorded { url, error: e }
            }
        }
    }

    async fn persist(&self, post: &Post, record: &SyndicationRecord) -> Result<(), PosseErr> {
        let mut attempt = 1;
        loop {
            match self.store.append(&post.path, record).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < PERSIST_ATTEMPTS => {
                    debug!(
                        "writing syndication record for {} failed (attempt {attempt}): {e}",
                        post.slug
                    );
                    tokio::time::sleep(self.persist_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
