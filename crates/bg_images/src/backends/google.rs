use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use bg_core::{Error, ImageSet, ImageSource, Result};
use super::{search_url, success_body, MAX_IMAGES};

const SERVICE: &str = "google";

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: String,
}

/// Google Programmable Search, image mode.
pub struct GoogleImageSearch {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl GoogleImageSearch {
    pub fn new(api_key: &str, engine_id: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            base_url: "https://www.googleapis.com".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for GoogleImageSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleImageSearch")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ImageSource for GoogleImageSearch {
    fn name(&self) -> &str {
        "Google"
    }

    async fn search(&self, query: &str) -> Result<ImageSet> {
        let num = MAX_IMAGES.to_string();
        let url = search_url(&self.base_url, "/customsearch/v1", &[
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("searchType", "image"),
            ("safe", "active"),
            ("num", num.as_str()),
            ("imgSize", "large"),
            ("q", query),
        ])?;

        let response = self.client.get(url).send().await?;
        let body = success_body(SERVICE, response).await?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream(SERVICE, format!("malformed response: {}", e)))?;
        let items = parsed
            .items
            .ok_or_else(|| Error::upstream(SERVICE, "response has no `items` list"))?;

        tracing::debug!("Google returned {} image(s) for {:?}", items.len(), query);
        Ok(items.into_iter().take(MAX_IMAGES).map(|item| item.link).collect())
    }
}
