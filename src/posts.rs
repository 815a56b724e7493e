use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use url::Url;

use crate::{
    error::PosseErr,
    frontmatter::Document,
    metadata::Platform,
};

/// A published (or draft) piece of writing, as far as syndication cares.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub slug: Arc<str>,
    pub path: PathBuf,
    pub title: Arc<str>,
    pub description: Arc<str>,
    pub tags: Vec<Arc<str>>,
    pub draft: bool,
    /// Platforms the post already has a record for.
    pub syndicated: Vec<Platform>,
}

impl Post {
    pub fn from_document(path: &Path, document: &Document) -> Result<Self, PosseErr> {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PosseErr::Other(format!("no slug in path: {}", path.display())))?;
        let metadata = document.metadata()?;
        let syndicated = metadata.syndicated_platforms();
        Ok(Self {
            slug: Arc::from(slug),
            path: path.to_path_buf(),
            title: metadata.title,
            description: metadata.description.unwrap_or_else(|| Arc::from("")),
            tags: metadata.tags.unwrap_or_default(),
            draft: metadata.draft.unwrap_or(false),
            syndicated,
        })
    }

    /// Canonical URL of the post on the site: `{site}{prefix}{slug}/`.
    pub fn url(&self, site_url: &Url, prefix: &str) -> Result<Url, PosseErr> {
        let prefix = prefix.trim_matches('/');
        let path = if prefix.is_empty() {
            format!("/{}/", self.slug)
        } else {
            format!("/{prefix}/{}/", self.slug)
        };
        Ok(site_url.join(&path)?)
    }

    pub fn syndicated_platforms(&self) -> HashSet<Platform> {
        self.syndicated.iter().copied().collect()
    }
}
