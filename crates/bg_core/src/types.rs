use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A topic driving one generation + publish job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject(String);

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Candidate texts returned by the generation service, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub candidates: Vec<String>,
}

impl GenerationResult {
    pub fn first(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }
}

/// Ordered image URLs. Index 0 is the cover, the rest go into the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    urls: Vec<String>,
}

impl ImageSet {
    pub const COVER: usize = 0;

    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.urls.get(index).map(String::as_str)
    }

    pub fn cover(&self) -> Option<&str> {
        self.get(Self::COVER)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

impl FromIterator<String> for ImageSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedArticle {
    pub title: String,
    pub body_html: String,
}

/// Static per-run metadata attached to every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub author: String,
    pub tags: Vec<String>,
    pub published: bool,
}

impl ArticleMetadata {
    /// Articles are always created as drafts.
    pub fn draft(author: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            author: author.into(),
            tags,
            published: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub body_html: String,
    pub cover_image_url: Option<String>,
    pub metadata: ArticleMetadata,
}

impl PublishRequest {
    pub fn new(article: ComposedArticle, images: &ImageSet, metadata: ArticleMetadata) -> Self {
        Self {
            title: article.title,
            body_html: article.body_html,
            cover_image_url: images.cover().map(str::to_string),
            metadata,
        }
    }
}

/// What the backend handed back for a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedArticle {
    pub id: Option<u64>,
    pub collection_id: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub payload: serde_json::Value,
}
