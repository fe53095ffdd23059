use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use bg_core::config::ShopConfig;
use bg_core::{Error, PublishRequest, PublishedArticle, Publisher, Result};

const SERVICE: &str = "shopify";
const TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Deserialize)]
struct BlogsResponse {
    blogs: Option<Vec<Blog>>,
}

#[derive(Deserialize)]
struct Blog {
    id: u64,
}

#[derive(Serialize)]
struct ArticleEnvelope<'a> {
    article: ArticlePayload<'a>,
}

#[derive(Serialize)]
struct ArticlePayload<'a> {
    blog_id: u64,
    title: &'a str,
    author: &'a str,
    tags: String,
    body_html: &'a str,
    published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ArticleImage<'a>>,
}

#[derive(Serialize)]
struct ArticleImage<'a> {
    src: &'a str,
}

/// Publishes drafts to the first blog of a Shopify store.
pub struct ShopifyPublisher {
    client: Client,
    base_url: String,
    api_version: String,
    access_token: String,
}

impl ShopifyPublisher {
    pub fn new(config: &ShopConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: format!("https://{}", config.domain),
            api_version: config.api_version.clone(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/admin/api/{}/{}", self.base_url, self.api_version, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(TOKEN_HEADER, &self.access_token)
            .header("Content-Type", "application/json")
    }

    /// Id of the first blog in the store.
    pub async fn collection_id(&self) -> Result<u64> {
        let response = self
            .authorized(self.client.get(self.endpoint("blogs.json")))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::upstream(SERVICE, format!("status {}: {}", status, body)));
        }

        let parsed: BlogsResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream(SERVICE, format!("malformed blogs response: {}", e)))?;
        let blogs = parsed
            .blogs
            .ok_or_else(|| Error::upstream(SERVICE, "response has no `blogs` list"))?;
        blogs.first().map(|blog| blog.id).ok_or(Error::NoCollectionFound)
    }
}

impl fmt::Debug for ShopifyPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyPublisher")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Publisher for ShopifyPublisher {
    fn name(&self) -> &str {
        "Shopify"
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishedArticle> {
        let blog_id = self.collection_id().await?;
        tracing::debug!("Publishing to blog {}", blog_id);

        let envelope = ArticleEnvelope {
            article: ArticlePayload {
                blog_id,
                title: &request.title,
                author: &request.metadata.author,
                tags: request.metadata.tags.join(", "),
                body_html: &request.body_html,
                published: request.metadata.published,
                image: request.cover_image_url.as_deref().map(|src| ArticleImage { src }),
            },
        };

        let path = format!("blogs/{}/articles.json", blog_id);
        let response = self
            .authorized(self.client.post(self.endpoint(&path)))
            .json(&envelope)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<Value>(&body);

        if let Some(errors) = parsed.as_ref().ok().and_then(|p| p.get("errors")) {
            return Err(Error::Publish(errors.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Publish(format!("status {}: {}", status, body)));
        }

        let payload = parsed
            .map_err(|e| Error::upstream(SERVICE, format!("malformed article response: {}", e)))?;
        let article = payload
            .get("article")
            .filter(|a| a.is_object())
            .ok_or_else(|| Error::upstream(SERVICE, "response has no `article` object"))?;
        let id = article
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::upstream(SERVICE, "created article has no `id`"))?;
        let created_at = article
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<DateTime<Utc>>().ok());

        Ok(PublishedArticle {
            id: Some(id),
            collection_id: blog_id,
            created_at,
            payload,
        })
    }
}
