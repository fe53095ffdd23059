pub mod config;
pub mod error;
pub mod sources;
pub mod types;
pub mod worklist;

pub use config::{Config, InsertionPolicy, RunMode};
pub use error::{Error, Result};
pub use sources::{ContentGenerator, ImageSource, Publisher};
pub use types::{
    ArticleMetadata, ComposedArticle, GenerationResult, ImageSet, PublishRequest,
    PublishedArticle, Subject,
};
pub use worklist::Worklist;
