use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[command(flatten)]
    pub verbose: Verbosity,
    /// Options for `syndicate` when it runs as the default command.
    #[command(flatten)]
    pub syndicate: SyndicateArgs,
    /// Path to the project directory.
    #[clap(long, global = true, default_value = ".")]
    pub path: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        name = "syndicate",
        about = "Announce published posts that are missing on a target platform. [default]"
    )]
    Syndicate(SyndicateArgs),
    #[command(name = "new-post", about = "Create an empty post with valid front-matter.")]
    NewPost(NewPostArgs),
    #[command(
        name = "ingest",
        about = "Add front-matter to an existing markdown file and move it into the content directory."
    )]
    Ingest(IngestArgs),
}

#[derive(Parser, Debug)]
pub struct SyndicateArgs {
    /// Print what would be posted without calling any platform or touching any file.
    #[clap(long, action)]
    pub dry_run: bool,
    #[clap(long, env = "BLUESKY_HANDLE", hide_env_values = true)]
    pub bluesky_handle: Option<String>,
    #[clap(long, env = "BLUESKY_APP_PASSWORD", hide_env_values = true)]
    pub bluesky_app_password: Option<String>,
    /// Base URL of the Mastodon instance, e.g. https://mastodon.social
    #[clap(long, env = "MASTODON_INSTANCE", hide_env_values = true)]
    pub mastodon_instance: Option<String>,
    #[clap(long, env = "MASTODON_TOKEN", hide_env_values = true)]
    pub mastodon_token: Option<String>,
}

#[derive(Parser, Debug)]
pub struct NewPostArgs {
    /// Post title, 1 to 100 characters.
    #[clap(short, long)]
    pub title: String,
    /// Short summary, up to 200 characters.
    #[clap(short, long, default_value = "")]
    pub description: String,
    /// Tag from the taxonomy, can be specified up to four times.
    #[clap(long = "tag", required = true)]
    pub tags: Vec<String>,
    /// Slug to use instead of one derived from the title.
    #[clap(long)]
    pub slug: Option<String>,
    /// Create the post as published instead of as a draft.
    #[clap(long, action)]
    pub publish: bool,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Markdown file to ingest.
    pub file: PathBuf,
    /// Title, taken from the first heading or the file name when absent.
    #[clap(short, long)]
    pub title: Option<String>,
    /// Description, taken from the first paragraph when absent.
    #[clap(short, long)]
    pub description: Option<String>,
    /// Tag from the taxonomy. Suggested from the content when absent.
    #[clap(long = "tag")]
    pub tags: Vec<String>,
    #[clap(long)]
    pub slug: Option<String>,
    #[clap(long, action)]
    pub publish: bool,
    /// Replace front-matter the file already has.
    #[clap(short, long, action)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn syndicate_is_the_default_command() {
        let args = Args::try_parse_from(["posse", "--path", "site"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.path, PathBuf::from("site"));
    }

    #[test]
    fn dry_run_works_without_the_subcommand() {
        let args = Args::try_parse_from(["posse", "--dry-run"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.syndicate.dry_run);

        let args = Args::try_parse_from(["posse", "syndicate", "--dry-run"]).unwrap();
        let Some(Commands::Syndicate(syndicate)) = args.command else {
            panic!("expected syndicate");
        };
        assert!(syndicate.dry_run);
    }

    #[test]
    fn new_post_collects_repeated_tags() {
        let args = Args::try_parse_from([
            "posse", "new-post", "--title", "Hello", "--tag", "meta", "--tag", "til",
        ])
        .unwrap();
        let Some(Commands::NewPost(new_post)) = args.command else {
            panic!("expected new-post");
        };
        assert_eq!(new_post.tags, vec!["meta", "til"]);
        assert!(!new_post.publish);
    }

    #[test]
    fn new_post_requires_a_tag() {
        assert!(Args::try_parse_from(["posse", "new-post", "--title", "Hello"]).is_err());
    }
}
