use std::path::Path;

use linked_hash_map::LinkedHashMap;
use serde_yaml::Value;
use tokio::fs::read_to_string;

use crate::{
    error::{ContextExt, PosseErr},
    fs::write_file,
    metadata::{Metadata, SyndicationRecord},
};

const DELIMITER: &str = "---";
const SYNDICATION: &str = "syndication";

/// A markdown file split into its YAML front-matter and body.
///
/// Front-matter keys keep their original order so that a write-back only
/// changes what was explicitly modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front: LinkedHashMap<String, Value>,
    pub body: String,
    /// The file started with a UTF-8 byte order mark.
    pub bom: bool,
    /// The front-matter block used `\r\n` line endings.
    pub crlf: bool,
}

impl Document {
    pub fn parse(raw: &str) -> Result<Self, PosseErr> {
        let bom = raw.starts_with('\u{feff}');
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        let mut lines = raw.split_inclusive('\n');
        let first = lines.next().unwrap_or_default();
        let crlf = first.ends_with("\r\n");
        if first.trim_end() != DELIMITER {
            return Err(PosseErr::Frontmatter("missing opening '---'".into()));
        }

        let mut offset = first.len();
        let yaml_start = offset;
        let mut yaml_end = None;
        for line in lines {
            if line.trim_end() == DELIMITER {
                yaml_end = Some((offset, offset + line.len()));
                break;
            }
            offset += line.len();
        }
        let Some((yaml_end, body_start)) = yaml_end else {
            return Err(PosseErr::Frontmatter("missing closing '---'".into()));
        };

        let yaml = &raw[yaml_start..yaml_end];
        let front = if yaml.trim().is_empty() {
            LinkedHashMap::new()
        } else {
            serde_yaml::from_str(yaml)?
        };

        Ok(Self {
            front,
            body: raw[body_start..].to_string(),
            bom,
            crlf,
        })
    }

    pub fn metadata(&self) -> Result<Metadata, PosseErr> {
        Ok(serde_yaml::from_value(serde_yaml::to_value(&self.front)?)?)
    }

    /// Appends `record` to the `syndication` list, creating the list when absent.
    pub fn push_syndication(&mut self, record: &SyndicationRecord) -> Result<(), PosseErr> {
        let record = serde_yaml::to_value(record)?;
        match self.front.get_mut(SYNDICATION) {
            Some(Value::Sequence(records)) => records.push(record),
            Some(Value::Null) | None => {
                self.front
                    .insert(SYNDICATION.to_string(), Value::Sequence(vec![record]));
            }
            Some(_) => {
                return Err(PosseErr::Frontmatter(
                    "'syndication' must be a list".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn render(&self) -> Result<String, PosseErr> {
        let yaml = if self.front.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&self.front)?
        };
        let mut front = format!("{DELIMITER}\n{yaml}{DELIMITER}\n");
        if self.crlf {
            front = front.replace('\n', "\r\n");
        }
        let bom = if self.bom { "\u{feff}" } else { "" };
        Ok(format!("{bom}{front}{}", self.body))
    }
}

pub async fn read_document(path: &Path) -> Result<Document, PosseErr> {
    let raw = read_to_string(path)
        .await
        .with_context(|| format!("read post: {}", path.display()))?;
    Document::parse(&raw).with_context(|| format!("parse front-matter: {}", path.display()))
}

/// Re-reads the file at `path`, appends `record` and writes it back atomically.
pub async fn append_syndication(path: &Path, record: &SyndicationRecord) -> Result<(), PosseErr> {
    let mut document = read_document(path).await?;
    document.push_syndication(record)?;
    let rendered = document.render()?;
    write_file(path, rendered.as_bytes())
        .await
        .with_context(|| format!("write post: {}", path.display()))
}

/// Where syndication records are persisted. The executor only ever appends.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, path: &Path, record: &SyndicationRecord) -> Result<(), PosseErr>;
}

/// Persists records into the post's own front-matter.
pub struct FrontmatterStore;

#[async_trait::async_trait]
impl RecordStore for FrontmatterStore {
    async fn append(&self, path: &Path, record: &SyndicationRecord) -> Result<(), PosseErr> {
        append_syndication(path, record).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::metadata::Platform;

    const POST: &str = "---\ntitle: Hello\ndescription: First post\npubDate: 2024-05-01\ntags:\n- linux\n- web-dev\n---\n\n# Hello\n\nBody text.\n";

    fn record(platform: Platform, url: &str) -> SyndicationRecord {
        SyndicationRecord {
            platform,
            url: url.into(),
            syndicated_at: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        }
    }

    fn records(document: &Document) -> Vec<SyndicationRecord> {
        serde_yaml::from_value(document.front[SYNDICATION].clone()).unwrap()
    }

    #[test]
    fn parses_front_matter_and_body() {
        let document = Document::parse(POST).unwrap();
        assert_eq!(document.body, "\n# Hello\n\nBody text.\n");
        let keys: Vec<&str> = document.front.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "description", "pubDate", "tags"]);

        let metadata = document.metadata().unwrap();
        assert_eq!(metadata.title.as_ref(), "Hello");
        assert_eq!(metadata.tags.unwrap().len(), 2);
        assert_eq!(metadata.draft, None);
    }

    #[test]
    fn tolerates_crlf_delimiters() {
        let document = Document::parse("---\r\ntitle: Hi\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(document.body, "body\r\n");
        assert_eq!(document.metadata().unwrap().title.as_ref(), "Hi");
    }

    #[test]
    fn keeps_bom_and_line_endings_on_render() {
        let raw = "\u{feff}---\r\ntitle: Hi\r\n---\r\nline one\r\nline two\r\n";
        let mut document = Document::parse(raw).unwrap();
        assert!(document.bom);
        assert!(document.crlf);
        assert_eq!(document.render().unwrap(), raw);

        document
            .push_syndication(&record(Platform::Mastodon, "https://mastodon.social/@me/1"))
            .unwrap();
        let rendered = document.render().unwrap();
        assert!(rendered.starts_with("\u{feff}---\r\ntitle: Hi\r\nsyndication:\r\n"));
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn rejects_missing_delimiters() {
        assert!(Document::parse("# Just markdown\n").is_err());
        assert!(Document::parse("---\ntitle: Hi\nno end\n").is_err());
    }

    #[test]
    fn missing_title_fails_metadata() {
        let document = Document::parse("---\ndescription: no title\n---\n").unwrap();
        assert!(document.metadata().is_err());
    }

    #[test]
    fn push_preserves_other_fields_and_body() {
        let mut document = Document::parse(POST).unwrap();
        document
            .push_syndication(&record(Platform::Bluesky, "https://bsky.app/profile/me/post/1"))
            .unwrap();
        let rendered = document.render().unwrap();

        let reparsed = Document::parse(&rendered).unwrap();
        assert_eq!(reparsed.body, "\n# Hello\n\nBody text.\n");
        let keys: Vec<&str> = reparsed.front.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["title", "description", "pubDate", "tags", "syndication"]
        );
        assert_eq!(reparsed.front["pubDate"], Value::String("2024-05-01".into()));
        assert_eq!(
            records(&reparsed),
            vec![record(Platform::Bluesky, "https://bsky.app/profile/me/post/1")]
        );
    }

    #[test]
    fn syndication_must_be_a_list() {
        let mut document = Document::parse("---\ntitle: x\nsyndication: nope\n---\n").unwrap();
        assert!(
            document
                .push_syndication(&record(Platform::Mastodon, "u"))
                .is_err()
        );
    }

    #[tokio::test]
    async fn append_keeps_existing_records_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.md");
        std::fs::write(&path, POST).unwrap();

        let first = record(Platform::Mastodon, "https://mastodon.social/@me/1");
        let second = record(Platform::Bluesky, "https://bsky.app/profile/me/post/2");
        append_syndication(&path, &first).await.unwrap();
        FrontmatterStore.append(&path, &second).await.unwrap();

        let document = read_document(&path).await.unwrap();
        assert_eq!(
            records(&document),
            vec![first, second]
        );
        assert_eq!(document.body, "\n# Hello\n\nBody text.\n");
    }
}
