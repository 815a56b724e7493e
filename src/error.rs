use std::{fmt::Display, io};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosseErr {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Async runtime error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] taxonomy::TaxonomyError),
    #[error("Front-matter error: {0}")]
    Frontmatter(String),
    #[error("{platform} responded with status {status}:\n{body}")]
    Platform {
        platform: String,
        status: u16,
        body: String,
    },
    #[error("{context}:\n{source}")]
    Context {
        context: String,
        source: Box<PosseErr>,
    },
    #[error("{0}")]
    Other(String),
}

impl From<String> for PosseErr {
    fn from(err: String) -> Self {
        PosseErr::Other(err)
    }
}

impl From<&str> for PosseErr {
    fn from(err: &str) -> Self {
        PosseErr::Other(err.to_string())
    }
}

/// Attaches a human readable context to any error convertible into [`PosseErr`].
pub trait ContextExt<T> {
    fn with_context<C, F>(self, f: F) -> Result<T, PosseErr>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E> ContextExt<T> for Result<T, E>
where
    E: Into<PosseErr>,
{
    fn with_context<C, F>(self, f: F) -> Result<T, PosseErr>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| PosseErr::Context {
            context: f().to_string(),
            source: Box::new(err.into()),
        })
    }
}
