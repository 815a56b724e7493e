use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::tags::valid_tags;

/// Lowercase words and phrases found in content, mapped to the tag they suggest.
const TAG_KEYWORDS: &[(&str, &str)] = &[
    // Tech & Homelab
    ("self-host", "homelab"),
    ("selfhost", "homelab"),
    ("proxmox", "homelab"),
    ("server", "homelab"),
    ("nas", "homelab"),
    ("truenas", "homelab"),
    ("unraid", "homelab"),
    ("container", "docker"),
    ("docker compose", "docker"),
    ("dockerfile", "docker"),
    ("compose", "docker"),
    ("ubuntu", "linux"),
    ("debian", "linux"),
    ("bash", "linux"),
    ("terminal", "linux"),
    ("cli", "linux"),
    ("systemd", "linux"),
    ("dns", "networking"),
    ("vpn", "networking"),
    ("wireguard", "networking"),
    ("tailscale", "networking"),
    ("firewall", "networking"),
    ("vlan", "networking"),
    ("ci/cd", "automation"),
    ("github actions", "automation"),
    ("cron", "automation"),
    ("script", "automation"),
    ("pipeline", "automation"),
    ("astro", "web-dev"),
    ("svelte", "web-dev"),
    ("tailwind", "web-dev"),
    ("typescript", "web-dev"),
    ("frontend", "web-dev"),
    ("css", "web-dev"),
    ("react", "web-dev"),
    // Movement & Training
    ("jiu-jitsu", "bjj"),
    ("jiu jitsu", "bjj"),
    ("grappling", "bjj"),
    ("submission", "bjj"),
    ("guard", "bjj"),
    ("mobility", "movement"),
    ("stretching", "movement"),
    ("flexibility", "movement"),
    ("movement practice", "movement"),
    ("programming", "training"),
    ("periodisation", "training"),
    ("strength", "training"),
    ("conditioning", "training"),
    // Productivity & Life
    ("attention deficit", "adhd"),
    ("neurodivergent", "adhd"),
    ("executive function", "adhd"),
    ("workflow", "productivity"),
    ("time management", "productivity"),
    ("habits", "productivity"),
    ("systems", "productivity"),
    ("obsidian", "pkm"),
    ("second brain", "pkm"),
    ("knowledge management", "pkm"),
    ("zettelkasten", "pkm"),
    ("note-taking", "pkm"),
    // Meta & Essays
    ("this site", "meta"),
    ("gvns.ca", "meta"),
    ("behind the scenes", "meta"),
    ("changelog", "meta"),
    ("opinion", "essay"),
    ("argument", "essay"),
    ("step by step", "tutorial"),
    ("how to", "tutorial"),
    ("guide", "tutorial"),
    ("walkthrough", "tutorial"),
    ("today i learned", "til"),
    ("quick tip", "til"),
    ("snippet", "til"),
];

struct Keyword {
    phrase: &'static str,
    tag: &'static str,
    pattern: Regex,
}

/// Keyword patterns, longest phrase first so that longer phrases claim their span
/// before any shorter phrase contained in them.
static KEYWORDS: LazyLock<Vec<Keyword>> = LazyLock::new(|| {
    let mut keywords: Vec<Keyword> = TAG_KEYWORDS
        .iter()
        .map(|(phrase, tag)| Keyword {
            phrase,
            tag,
            pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                .expect("keyword pattern to be valid"),
        })
        .collect();
    keywords.sort_by(|a, b| b.phrase.len().cmp(&a.phrase.len()));
    keywords
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub keyword: &'static str,
    pub tag: &'static str,
    pub span: Range<usize>,
}

/// Finds every keyword occurrence in `content`.
///
/// Matching is case-insensitive and bound to word boundaries. When two keywords
/// overlap, the longer one wins and the shorter one is not reported.
pub fn keyword_matches(content: &str) -> Vec<KeywordMatch> {
    let mut matches: Vec<KeywordMatch> = Vec::new();
    for keyword in KEYWORDS.iter() {
        for found in keyword.pattern.find_iter(content) {
            let span = found.range();
            let overlaps = matches
                .iter()
                .any(|m| m.span.start < span.end && span.start < m.span.end);
            if !overlaps {
                matches.push(KeywordMatch {
                    keyword: keyword.phrase,
                    tag: keyword.tag,
                    span,
                });
            }
        }
    }
    matches.sort_by_key(|m| m.span.start);
    matches
}

/// Suggests tags for `content`, distinct and in taxonomy order.
///
/// # Example
/// ```
/// use taxonomy::suggest_tags;
///
/// assert_eq!(suggest_tags("Running WireGuard on Debian"), vec!["linux", "networking"]);
/// ```
pub fn suggest_tags(content: &str) -> Vec<&'static str> {
    let matches = keyword_matches(content);
    valid_tags()
        .filter(|tag| matches.iter().any(|m| m.tag == *tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn respects_word_boundaries() {
        // "nas" inside "dynasty" and "cli" inside "click" must not match.
        assert!(suggest_tags("A dynasty of click-bait").is_empty());
        assert_eq!(suggest_tags("My NAS is full"), vec!["homelab"]);
    }

    #[test]
    fn longest_keyword_claims_the_span() {
        let matches = keyword_matches("Using docker compose everywhere");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].keyword, "docker compose");
        assert_eq!(matches[0].span, 6..20);
    }

    #[test]
    fn suggests_across_categories_in_taxonomy_order() {
        let content = "Today I learned how to self-host Obsidian sync. Grappling later.";
        assert_eq!(
            suggest_tags(content),
            vec!["homelab", "bjj", "pkm", "tutorial", "til"]
        );
    }

    #[test]
    fn matches_phrases_with_punctuation() {
        assert_eq!(suggest_tags("Our CI/CD setup"), vec!["automation"]);
        assert_eq!(suggest_tags("Notes about gvns.ca"), vec!["meta"]);
    }
}
