use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use numeric_sort::cmp;
use tracing::debug;

use crate::{
    error::{ContextExt, PosseErr},
    frontmatter::read_document,
    fs::get_files_by_ext_deep,
    posts::Post,
};

/// Lazily reads posts from a content directory, one file per call to [`Scanner::next`].
///
/// Opening a new scanner over the same root restarts the sequence.
pub struct Scanner {
    files: VecDeque<PathBuf>,
}

impl Scanner {
    /// Walks `root` for markdown files. Failing to read the root itself is fatal.
    pub async fn open(root: &Path) -> Result<Self, PosseErr> {
        let mut files = get_files_by_ext_deep(root, "md")
            .await
            .with_context(|| format!("content directory: {}", root.display()))?;
        files.sort_by(|a, b| cmp(&a.to_string_lossy(), &b.to_string_lossy()));
        debug!("found {} markdown files in {}", files.len(), root.display());
        Ok(Self {
            files: files.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }

    /// Next file and its parsed post. A malformed file only fails its own item.
    pub async fn next(&mut self) -> Option<(PathBuf, Result<Post, PosseErr>)> {
        let path = self.files.pop_front()?;
        let post = match read_document(&path).await {
            Ok(document) => Post::from_document(&path, &document)
                .with_context(|| format!("post metadata: {}", path.display())),
            Err(e) => Err(e),
        };
        Some((path, post))
    }
}
