//! Authoring helpers: scaffolding new posts and ingesting bare markdown files.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use taxonomy::{MAX_TAGS, find_unique_slug, slugify, suggest_tags, validate_tags};
use tokio::fs::read_to_string;
use tracing::info;

use crate::{
    error::{ContextExt, PosseErr},
    fs::{collect_slugs, create_file},
};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 200;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("heading pattern to be valid"));

static LEADING_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[ \t]+.+\n*").expect("heading pattern to be valid"));

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---\s*\n").expect("front-matter pattern to be valid"));

static FRONTMATTER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^---.*?---\n*").expect("front-matter pattern to be valid"));

/// Front-matter of a freshly created post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFrontmatter {
    pub title: String,
    pub description: String,
    pub pub_date: NaiveDate,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
}

impl NewFrontmatter {
    pub fn new(
        title: &str,
        description: &str,
        tags: Vec<String>,
        draft: bool,
        pub_date: NaiveDate,
    ) -> Result<Self, PosseErr> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title is required (max {MAX_TITLE_LEN} characters)").into());
        }
        let description = description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(format!("Description is limited to {MAX_DESCRIPTION_LEN} characters").into());
        }
        validate_tags(tags.as_slice())?;
        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            pub_date,
            tags,
            draft,
        })
    }

    pub fn render(&self, body: &str) -> Result<String, PosseErr> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("---\n{yaml}---\n\n{body}"))
    }
}

/// `{content}/{YYYY}/{MM}/{slug}.md`
pub fn post_path(content_root: &Path, date: NaiveDate, slug: &str) -> PathBuf {
    content_root
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{slug}.md"))
}

/// Picks the slug for a new post. An explicit slug must be free; a derived one is made
/// unique with a numeric suffix.
pub async fn choose_slug(
    content_root: &Path,
    title: &str,
    explicit: Option<&str>,
) -> Result<String, PosseErr> {
    let taken = collect_slugs(content_root).await?;
    if let Some(explicit) = explicit {
        let slug = slugify(explicit.trim());
        if slug.is_empty() {
            return Err("Slug is required".into());
        }
        if taken.contains(&slug) {
            return Err(format!("Slug \"{slug}\" already exists").into());
        }
        return Ok(slug);
    }
    let base = slugify(title);
    if base.is_empty() {
        return Err(format!("Cannot derive a slug from title \"{title}\", pass one explicitly").into());
    }
    let slug = find_unique_slug(&base, &taken);
    if slug != base {
        info!("slug \"{base}\" already exists, using \"{slug}\"");
    }
    Ok(slug)
}

pub struct NewPost {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub draft: bool,
}

/// Scaffolds an empty post with valid front-matter and returns its path.
pub async fn new_post(
    content_root: &Path,
    post: NewPost,
    today: NaiveDate,
) -> Result<PathBuf, PosseErr> {
    let frontmatter =
        NewFrontmatter::new(&post.title, &post.description, post.tags, post.draft, today)?;
    let slug = choose_slug(content_root, &frontmatter.title, post.slug.as_deref()).await?;
    let path = post_path(content_root, today, &slug);
    create_file(&path, frontmatter.render("")?.as_bytes())
        .await
        .with_context(|| format!("create post: {}", path.display()))?;
    info!("created {}", path.display());
    Ok(path)
}

pub fn has_frontmatter(content: &str) -> bool {
    FRONTMATTER.is_match(content)
}

pub fn strip_frontmatter(content: &str) -> &str {
    match FRONTMATTER_BLOCK.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// First `# ` heading, or the file name turned back into words.
pub fn extract_title(body: &str, filename: &str) -> String {
    if let Some(caps) = HEADING.captures(body) {
        return caps[1].trim().to_string();
    }
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    let mut title = String::with_capacity(stem.len());
    let mut previous_is_word = false;
    for c in stem.chars().map(|c| if c == '-' || c == '_' { ' ' } else { c }) {
        let is_word = c.is_alphanumeric();
        if is_word && !previous_is_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        previous_is_word = is_word;
    }
    title
}

/// First real paragraph of `body`, skipping headings, code fences, lists and tables.
/// Longer than [`MAX_DESCRIPTION_LEN`] characters gets cut with an ellipsis.
pub fn extract_description(body: &str) -> String {
    let body = strip_frontmatter(body);
    let without_heading = HEADING.replace(body, "");
    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_fence = false;
    for line in without_heading.trim().lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            if !paragraph.is_empty() {
                break;
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        if ["#", "- ", "|"]
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(trimmed);
    }
    let paragraph = paragraph.join(" ");
    if paragraph.chars().count() <= MAX_DESCRIPTION_LEN {
        return paragraph;
    }
    let cut: String = paragraph.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
    format!("{cut}...")
}

pub struct Ingest {
    pub source: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub draft: bool,
    pub force: bool,
}

/// Copies a bare markdown file into the content directory with generated front-matter.
pub async fn ingest(
    content_root: &Path,
    ingest: Ingest,
    today: NaiveDate,
) -> Result<PathBuf, PosseErr> {
    let content = read_to_string(&ingest.source)
        .await
        .with_context(|| format!("read markdown file: {}", ingest.source.display()))?;

    if has_frontmatter(&content) && !ingest.force {
        return Err(format!(
            "{} already has front-matter, use --force to replace it",
            ingest.source.display()
        )
        .into());
    }
    let body = strip_frontmatter(&content);

    let filename = ingest
        .source
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default();
    let title = ingest
        .title
        .unwrap_or_else(|| extract_title(body, filename));
    let description = ingest
        .description
        .unwrap_or_else(|| extract_description(body));

    let tags = if ingest.tags.is_empty() {
        let suggested = suggest_tags(body);
        if suggested.is_empty() {
            return Err("No tags could be suggested from the content, pass at least one --tag".into());
        }
        info!("suggested tags: {}", suggested.join(", "));
        suggested
            .into_iter()
            .take(MAX_TAGS)
            .map(String::from)
            .collect()
    } else {
        ingest.tags
    };

    let frontmatter = NewFrontmatter::new(&title, &description, tags, ingest.draft, today)?;
    let slug = choose_slug(content_root, &frontmatter.title, ingest.slug.as_deref()).await?;
    let path = post_path(content_root, today, &slug);

    let clean_body = LEADING_HEADING.replace(body, "");
    let output = frontmatter.render(&format!("{}\n", clean_body.trim()))?;
    create_file(&path, output.as_bytes())
        .await
        .with_context(|| format!("create post: {}", path.display()))?;
    info!("ingested {} as {}", ingest.source.display(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::{frontmatter::read_document, posts::Post};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn renders_front_matter_that_reads_back() {
        let frontmatter = NewFrontmatter::new(
            "Say \"hi\"",
            "A: colon",
            vec!["linux".into()],
            true,
            date(),
        )
        .unwrap();
        let rendered = frontmatter.render("").unwrap();
        assert!(rendered.contains("pubDate:"));
        assert!(rendered.contains("2025-03-07"));
        assert!(rendered.contains("draft: true\n"));

        let document = crate::frontmatter::Document::parse(&rendered).unwrap();
        let metadata = document.metadata().unwrap();
        assert_eq!(metadata.title.as_ref(), "Say \"hi\"");
        assert_eq!(metadata.description.unwrap().as_ref(), "A: colon");
        assert_eq!(metadata.draft, Some(true));
    }

    #[test]
    fn published_posts_have_no_draft_key() {
        let frontmatter =
            NewFrontmatter::new("Hi", "", vec!["til".into()], false, date()).unwrap();
        assert!(!frontmatter.render("").unwrap().contains("draft"));
    }

    #[test]
    fn validates_title_description_and_tags() {
        assert!(NewFrontmatter::new(" ", "", vec!["til".into()], true, date()).is_err());
        assert!(NewFrontmatter::new(&"x".repeat(101), "", vec!["til".into()], true, date()).is_err());
        assert!(NewFrontmatter::new("t", &"x".repeat(201), vec!["til".into()], true, date()).is_err());
        assert!(NewFrontmatter::new("t", "", vec![], true, date()).is_err());
        assert!(NewFrontmatter::new("t", "", vec!["cooking".into()], true, date()).is_err());
    }

    #[test]
    fn extracts_title_from_heading_or_filename() {
        assert_eq!(extract_title("intro\n# The Title \n", "x.md"), "The Title");
        assert_eq!(
            extract_title("no heading", "my_home-lab.setup.md"),
            "My Home Lab.Setup"
        );
    }

    #[test]
    fn extracts_first_paragraph() {
        let body = "# Title\n\n```sh\nls\n```\n\nFirst line\ncontinues here.\n\nSecond paragraph.\n";
        assert_eq!(extract_description(body), "First line continues here.");

        let long = format!("# T\n\n{}\n", "word ".repeat(60));
        let description = extract_description(&long);
        assert_eq!(description.chars().count(), 200);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn strips_existing_front_matter() {
        assert!(has_frontmatter("---\ntitle: x\n---\nbody"));
        assert_eq!(strip_frontmatter("---\ntitle: x\n---\n\nbody"), "body");
        assert_eq!(strip_frontmatter("body"), "body");
    }

    #[tokio::test]
    async fn new_post_lands_in_dated_folder_with_unique_slug() {
        let dir = TempDir::new().unwrap();
        let first = new_post(
            dir.path(),
            NewPost {
                title: "Hello World".into(),
                description: "".into(),
                tags: vec!["meta".into()],
                slug: None,
                draft: true,
            },
            date(),
        )
        .await
        .unwrap();
        let second = new_post(
            dir.path(),
            NewPost {
                title: "Hello, world!".into(),
                description: "again".into(),
                tags: vec!["meta".into()],
                slug: None,
                draft: false,
            },
            date(),
        )
        .await
        .unwrap();

        assert_eq!(first, dir.path().join("2025/03/hello-world.md"));
        assert_eq!(second, dir.path().join("2025/03/hello-world-2.md"));

        let document = read_document(&second).await.unwrap();
        let post = Post::from_document(&second, &document).unwrap();
        assert_eq!(post.slug.as_ref(), "hello-world-2");
        assert!(!post.draft);
    }

    #[tokio::test]
    async fn explicit_slug_must_be_free() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("2020/01")).unwrap();
        std::fs::write(dir.path().join("2020/01/taken.md"), "").unwrap();
        assert!(choose_slug(dir.path(), "Anything", Some("taken")).await.is_err());
        assert_eq!(
            choose_slug(dir.path(), "Anything", Some("Free Slug")).await.unwrap(),
            "free-slug"
        );
    }

    #[tokio::test]
    async fn ingest_generates_front_matter_and_keeps_body() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("wireguard-notes.md");
        std::fs::write(
            &source,
            "# WireGuard on Debian\n\nSetting up a VPN between two hosts.\n\n## Steps\n\nInstall it.\n",
        )
        .unwrap();
        let content_root = dir.path().join("writing");

        let path = ingest(
            &content_root,
            Ingest {
                source,
                title: None,
                description: None,
                tags: vec![],
                slug: None,
                draft: true,
                force: false,
            },
            date(),
        )
        .await
        .unwrap();

        assert_eq!(path, content_root.join("2025/03/wireguard-on-debian.md"));
        let document = read_document(&path).await.unwrap();
        let metadata = document.metadata().unwrap();
        assert_eq!(metadata.title.as_ref(), "WireGuard on Debian");
        assert_eq!(
            metadata.description.unwrap().as_ref(),
            "Setting up a VPN between two hosts."
        );
        let tags: Vec<String> = metadata
            .tags
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(tags, vec!["linux", "networking"]);
        assert_eq!(
            document.body,
            "\nSetting up a VPN between two hosts.\n\n## Steps\n\nInstall it.\n"
        );
    }

    #[tokio::test]
    async fn ingest_refuses_front_matter_without_force() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("post.md");
        std::fs::write(&source, "---\ntitle: Old\n---\n# New\n\nText about cron.\n").unwrap();
        let request = |force| Ingest {
            source: source.clone(),
            title: None,
            description: None,
            tags: vec![],
            slug: None,
            draft: true,
            force,
        };

        assert!(ingest(dir.path(), request(false), date()).await.is_err());
        let path = ingest(&dir.path().join("out"), request(true), date())
            .await
            .unwrap();
        let metadata = read_document(&path).await.unwrap().metadata().unwrap();
        assert_eq!(metadata.title.as_ref(), "New");
        assert_eq!(metadata.tags.unwrap(), vec![Arc::<str>::from("automation")]);
    }
}
