use itertools::Itertools;

/// Tag as a hashtag: `web-dev` becomes `#webdev`.
pub fn hashtag(tag: &str) -> String {
    format!("#{}", tag.replace('-', ""))
}

/// Announcement text shared by every platform.
pub fn render_text<T: AsRef<str>>(title: &str, description: &str, url: &str, tags: &[T]) -> String {
    let hashtags = tags.iter().map(|t| hashtag(t.as_ref())).join(" ");
    format!("📝 {title}\n\n{description}\n\n{url}\n\n{hashtags}")
}
