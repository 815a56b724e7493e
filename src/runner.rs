use std::path::Path;

use itertools::Itertools;
use tracing::{debug, error, info};

use crate::{
    error::PosseErr,
    executor::{Executor, Outcome},
    planner::Router,
    scanner::Scanner,
};

/// Counters for a single run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub scanned: usize,
    pub parse_errors: usize,
    pub drafts: usize,
    pub up_to_date: usize,
    pub planned: usize,
    pub syndicated: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unrecorded: usize,
}

impl Report {
    pub fn summary(&self) -> String {
        let mut summary = if self.dry_run > 0 {
            format!(
                "Dry run: {} post(s) would be syndicated to {} platform(s).",
                self.planned, self.dry_run
            )
        } else if self.syndicated == 0 && self.planned > 0 {
            format!("Nothing syndicated, {} post(s) still pending.", self.planned)
        } else if self.syndicated == 0 {
            "All posts are already syndicated — nothing to do.".to_string()
        } else {
            format!("Syndicated {} post(s).", self.syndicated)
        };
        let problems = [
            (self.skipped, "skipped for missing credentials"),
            (self.failed, "failed"),
            (self.parse_errors, "unreadable post(s)"),
            (self.unrecorded, "posted but NOT recorded"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .join(", ");
        if !problems.is_empty() {
            summary.push_str(&format!(" ({problems})"));
        }
        summary
    }
}

/// Scans `content_root`, plans every post and executes what is missing, strictly one
/// post and one platform at a time. Only a failure to open the content root is returned
/// as an error; everything else is counted in the report.
pub async fn run(
    content_root: &Path,
    router: &Router,
    executor: &Executor,
) -> Result<Report, PosseErr> {
    if executor.is_dry_run() {
        info!("dry run, nothing will be published");
    }
    let mut scanner = Scanner::open(content_root).await?;
    debug!("{} posts to scan", scanner.remaining());
    let mut report = Report::default();

    while let Some((path, post)) = scanner.next().await {
        report.scanned += 1;
        let post = match post {
            Ok(post) => post,
            Err(e) => {
                error!(path = %path.display(), "skipping unreadable post: {e}");
                report.parse_errors += 1;
                continue;
            }
        };
        if post.draft {
            debug!(slug = %post.slug, "draft, skipping");
            report.drafts += 1;
            continue;
        }
        let Some(plan) = router.plan(&post) else {
            debug!(slug = %post.slug, "already syndicated everywhere");
            report.up_to_date += 1;
            continue;
        };

        report.planned += 1;
        info!(
            slug = %post.slug,
            url = %executor.post_url(&post).map(|u| u.to_string()).unwrap_or_default(),
            tags = %post.tags.iter().join(", "),
            targets = %plan.targets.iter().join(", "),
            missing = %plan.missing.iter().join(", "),
            "{}",
            post.title
        );

        let mut syndicated = false;
        for attempt in executor.execute(&plan).await {
            match attempt.outcome {
                Outcome::DryRun { text } => {
                    report.dry_run += 1;
                    info!(
                        "preview for {}:\n{}",
                        attempt.platform,
                        text.lines().map(|l| format!("    {l}")).join("\n")
                    );
                }
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(_) => report.failed += 1,
                Outcome::Syndicated { .. } => syndicated = true,
                Outcome::Unrecorded { .. } => {
                    syndicated = true;
                    report.unrecorded += 1;
                }
            }
        }
        if syndicated {
            report.syndicated += 1;
        }
    }

    Ok(report)
}
