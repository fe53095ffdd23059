use async_trait::async_trait;
use crate::types::{GenerationResult, ImageSet, PublishRequest, PublishedArticle};
use crate::Result;

#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &str;

    /// Search for images matching `query`, most relevant first.
    async fn search(&self, query: &str) -> Result<ImageSet>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Request completions for `prompt`. Never returns an empty result.
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &str;

    /// Submit an article to the backend's target collection.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedArticle>;
}
