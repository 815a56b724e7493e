use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("Unknown tag: {0}")]
    UnknownTag(String),
    #[error("At least one tag is required")]
    NoTags,
    #[error("Too many tags: {0} (maximum is {max})", max = crate::MAX_TAGS)]
    TooManyTags(usize),
}
