use std::{collections::HashSet, sync::Arc};

use crate::{metadata::Platform, posts::Post};

/// Decides which platforms a post belongs on.
#[derive(Debug, Clone)]
pub struct Router {
    platforms: Vec<Platform>,
    restricted_tags: HashSet<Arc<str>>,
    restricted_platform: Platform,
}

/// A post that still has at least one platform to be syndicated to.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub post: Post,
    pub targets: Vec<Platform>,
    pub missing: Vec<Platform>,
}

impl Router {
    pub fn new(
        platforms: Vec<Platform>,
        restricted_tags: impl IntoIterator<Item = Arc<str>>,
        restricted_platform: Platform,
    ) -> Self {
        Self {
            platforms,
            restricted_tags: restricted_tags.into_iter().collect(),
            restricted_platform,
        }
    }

    /// Any restricted tag narrows the targets to the restricted platform alone.
    pub fn targets(&self, tags: &[Arc<str>]) -> Vec<Platform> {
        if tags.iter().any(|t| self.restricted_tags.contains(t)) {
            vec![self.restricted_platform]
        } else {
            self.platforms.clone()
        }
    }

    pub fn plan(&self, post: &Post) -> Option<Plan> {
        if post.draft {
            return None;
        }
        let targets = self.targets(&post.tags);
        let missing = missing(post, &targets);
        if missing.is_empty() {
            return None;
        }
        Some(Plan {
            post: post.clone(),
            targets,
            missing,
        })
    }
}

/// Targets without a syndication record yet, in target order.
pub fn missing(post: &Post, targets: &[Platform]) -> Vec<Platform> {
    let done = post.syndicated_platforms();
    targets
        .iter()
        .filter(|p| !done.contains(*p))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn router() -> Router {
        Router::new(
            vec![Platform::Bluesky, Platform::Mastodon],
            ["bjj", "movement", "training"].map(Arc::<str>::from),
            Platform::Mastodon,
        )
    }

    fn post(tags: &[&str], draft: bool, done: &[Platform]) -> Post {
        Post {
            slug: "post".into(),
            path: PathBuf::from("post.md"),
            title: "Post".into(),
            description: "".into(),
            tags: tags.iter().map(|t| Arc::from(*t)).collect(),
            draft,
            syndicated: done.to_vec(),
        }
    }

    #[test]
    fn restricted_tags_route_to_single_platform() {
        let router = router();
        assert_eq!(router.targets(&["bjj".into()]), vec![Platform::Mastodon]);
        assert_eq!(
            router.targets(&["training".into(), "linux".into()]),
            vec![Platform::Mastodon]
        );
        assert_eq!(
            router.targets(&["linux".into(), "docker".into()]),
            vec![Platform::Bluesky, Platform::Mastodon]
        );
        assert_eq!(
            router.targets(&[]),
            vec![Platform::Bluesky, Platform::Mastodon]
        );
    }

    #[test]
    fn drafts_are_never_planned() {
        assert_eq!(router().plan(&post(&["linux"], true, &[])), None);
    }

    #[test]
    fn missing_excludes_recorded_platforms() {
        let router = router();
        let plan = router
            .plan(&post(&["linux"], false, &[Platform::Bluesky]))
            .unwrap();
        assert_eq!(plan.targets, vec![Platform::Bluesky, Platform::Mastodon]);
        assert_eq!(plan.missing, vec![Platform::Mastodon]);

        let done = post(&["linux"], false, &[Platform::Mastodon, Platform::Bluesky]);
        assert_eq!(router.plan(&done), None);
    }

    #[test]
    fn records_for_untargeted_platforms_are_ignored() {
        let post = post(&["bjj"], false, &[Platform::Bluesky]);
        assert_eq!(missing(&post, &router().targets(&post.tags)), vec![Platform::Mastodon]);
    }

    #[test]
    fn planning_is_repeatable() {
        let router = router();
        let post = post(&["docker"], false, &[]);
        assert_eq!(router.plan(&post), router.plan(&post));
    }
}
