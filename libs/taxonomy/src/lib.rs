pub mod error;
pub mod slug;
pub mod suggest;
pub mod tags;

pub use crate::error::TaxonomyError;

pub use crate::slug::{find_unique_slug, slugify};

pub use crate::suggest::suggest_tags;

pub use crate::tags::{MAX_TAGS, TAG_CATEGORIES, is_valid_tag, valid_tags, validate_tags};
