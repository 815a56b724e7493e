//! Rich-text facet detection for Bluesky posts.
//!
//! Facets annotate ranges of the post text with links, mentions and hashtags.
//! Ranges are UTF-8 byte offsets into the text, which is exactly what `regex`
//! reports.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(])(https?://[^\s]+)").expect("link pattern to be valid")
});

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[\s(])(@([a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+))",
    )
    .expect("mention pattern to be valid")
});

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([#＃][^\s#＃]+)").expect("hashtag pattern to be valid")
});

const MAX_TAG_LEN: usize = 64;

/// A facet found in the text, before mentions are resolved to DIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detected {
    Link { range: Range<usize>, uri: String },
    Mention { range: Range<usize>, handle: String },
    Tag { range: Range<usize>, tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "$type")]
pub enum Feature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<Feature>,
}

impl Facet {
    pub fn new(range: Range<usize>, feature: Feature) -> Self {
        Self {
            index: ByteSlice {
                byte_start: range.start,
                byte_end: range.end,
            },
            features: vec![feature],
        }
    }
}

fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(['.', ',', ';', ':', '!', '?', '"', '\''])
}

fn trim_link(s: &str) -> &str {
    let mut s = trim_trailing_punctuation(s);
    // A closing paren only belongs to the link when it has a matching opening one.
    while s.ends_with(')') && s.matches('(').count() < s.matches(')').count() {
        s = trim_trailing_punctuation(&s[..s.len() - 1]);
    }
    s
}

/// Finds links, mentions and hashtags, ordered by position.
pub fn detect(text: &str) -> Vec<Detected> {
    let mut found = Vec::new();

    for caps in LINK.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let uri = trim_link(m.as_str());
        found.push(Detected::Link {
            range: m.start()..m.start() + uri.len(),
            uri: uri.to_string(),
        });
    }

    for caps in MENTION.captures_iter(text) {
        let (Some(m), Some(handle)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        found.push(Detected::Mention {
            range: m.range(),
            handle: handle.as_str().to_string(),
        });
    }

    for caps in HASHTAG.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let token = trim_trailing_punctuation(m.as_str());
        let mut chars = token.chars();
        chars.next();
        let tag = chars.as_str();
        let numeric = tag.chars().all(|c| c.is_ascii_digit());
        if tag.is_empty() || numeric || tag.chars().count() > MAX_TAG_LEN {
            continue;
        }
        found.push(Detected::Tag {
            range: m.start()..m.start() + token.len(),
            tag: tag.to_string(),
        });
    }

    found.sort_by_key(|d| match d {
        Detected::Link { range, .. }
        | Detected::Mention { range, .. }
        | Detected::Tag { range, .. } => range.start,
    });
    found
}
