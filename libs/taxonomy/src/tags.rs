use crate::TaxonomyError;

/// Maximum amount of tags a single post may carry.
pub const MAX_TAGS: usize = 4;

/// Canonical tag taxonomy, grouped by category.
///
/// The order of categories and of tags inside each category is the order used
/// whenever tags are listed back to the author.
pub const TAG_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Tech & Homelab",
        &[
            "homelab",
            "docker",
            "linux",
            "networking",
            "automation",
            "web-dev",
        ],
    ),
    ("Movement & Training", &["bjj", "movement", "training"]),
    ("Productivity & Life", &["adhd", "productivity", "pkm"]),
    ("Meta & Essays", &["essay", "tutorial", "til", "meta"]),
];

/// All valid tags in taxonomy order.
pub fn valid_tags() -> impl Iterator<Item = &'static str> {
    TAG_CATEGORIES
        .iter()
        .flat_map(|(_, tags)| tags.iter().copied())
}

pub fn is_valid_tag(tag: &str) -> bool {
    valid_tags().any(|t| t == tag)
}

/// Checks that `tags` holds between one and [`MAX_TAGS`] known tags.
///
/// # Example
/// ```
/// use taxonomy::validate_tags;
///
/// assert!(validate_tags(&["linux", "docker"]).is_ok());
/// assert!(validate_tags::<&str>(&[]).is_err());
/// ```
pub fn validate_tags<T: AsRef<str>>(tags: &[T]) -> Result<(), TaxonomyError> {
    if tags.is_empty() {
        return Err(TaxonomyError::NoTags);
    }
    if tags.len() > MAX_TAGS {
        return Err(TaxonomyError::TooManyTags(tags.len()));
    }
    if let Some(unknown) = tags.iter().find(|t| !is_valid_tag(t.as_ref())) {
        return Err(TaxonomyError::UnknownTag(unknown.as_ref().to_string()));
    }
    Ok(())
}
