pub mod args;
pub mod authoring;
pub mod config;
pub mod error;
pub mod executor;
pub mod frontmatter;
pub mod fs;
pub mod metadata;
pub mod planner;
pub mod platforms;
pub mod posts;
pub mod render;
pub mod req;
pub mod runner;
pub mod scanner;

use std::path::Path;

use args::{Args, Commands, IngestArgs, NewPostArgs, SyndicateArgs};
use authoring::{Ingest, NewPost};
use chrono::Utc;
use clap::Parser;
use config::Config;
use error::PosseErr;
use executor::Executor;
use frontmatter::FrontmatterStore;
use platforms::{BlueskyCredentials, MastodonCredentials, init_publishers};
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .compact()
        .init();

    let result = match Config::try_from(args.path.as_path()) {
        Err(e) => Err(e),
        Ok(config) => {
            debug!("{config:?}");
            let content_root = args.path.join(&config.content_path);
            match args.command {
                Some(Commands::Syndicate(syndicate)) => {
                    syndicate_posts(&config, &content_root, syndicate).await
                }
                None => syndicate_posts(&config, &content_root, args.syndicate).await,
                Some(Commands::NewPost(new_post)) => create_post(&content_root, new_post).await,
                Some(Commands::Ingest(ingest)) => ingest_file(&content_root, ingest).await,
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn syndicate_posts(
    config: &Config,
    content_root: &Path,
    args: SyndicateArgs,
) -> Result<(), PosseErr> {
    let bluesky = BlueskyCredentials::from_parts(args.bluesky_handle, args.bluesky_app_password);
    let mastodon = MastodonCredentials::from_parts(args.mastodon_instance, args.mastodon_token)?;
    let publishers = init_publishers(config, bluesky, mastodon)?;
    let executor = Executor::new(
        publishers,
        Box::new(FrontmatterStore),
        config.site_url.clone(),
        config.post_path_prefix.clone(),
        args.dry_run,
    );
    let report = runner::run(content_root, &config.router(), &executor).await?;
    debug!("{report:?}");
    println!("{}", report.summary());
    Ok(())
}

async fn create_post(content_root: &Path, args: NewPostArgs) -> Result<(), PosseErr> {
    let path = authoring::new_post(
        content_root,
        NewPost {
            title: args.title,
            description: args.description,
            tags: args.tags,
            slug: args.slug,
            draft: !args.publish,
        },
        Utc::now().date_naive(),
    )
    .await?;
    println!("{}", path.display());
    Ok(())
}

async fn ingest_file(content_root: &Path, args: IngestArgs) -> Result<(), PosseErr> {
    let path = authoring::ingest(
        content_root,
        Ingest {
            source: args.file,
            title: args.title,
            description: args.description,
            tags: args.tags,
            slug: args.slug,
            draft: !args.publish,
            force: args.force,
        },
        Utc::now().date_naive(),
    )
    .await?;
    println!("{}", path.display());
    Ok(())
}
