use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use bg_core::{Error, ImageSet, ImageSource, Result};
use super::{search_url, success_body, MAX_IMAGES};

const SERVICE: &str = "unsplash";
const PER_PAGE: &str = "20";

#[derive(Deserialize)]
struct SearchResponse {
    results: Option<Vec<Photo>>,
}

#[derive(Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

pub struct UnsplashImageSearch {
    client: Client,
    access_key: String,
    base_url: String,
}

impl UnsplashImageSearch {
    pub fn new(access_key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            access_key: access_key.to_string(),
            base_url: "https://api.unsplash.com".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for UnsplashImageSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsplashImageSearch")
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ImageSource for UnsplashImageSearch {
    fn name(&self) -> &str {
        "Unsplash"
    }

    async fn search(&self, query: &str) -> Result<ImageSet> {
        let url = search_url(&self.base_url, "/search/photos", &[
            ("query", query),
            ("page", "1"),
            ("per_page", PER_PAGE),
            ("order_by", "relevant"),
        ])?;

        let response = self.client
            .get(url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()
            .await?;
        let body = success_body(SERVICE, response).await?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::upstream(SERVICE, format!("malformed response: {}", e)))?;
        let results = parsed
            .results
            .ok_or_else(|| Error::upstream(SERVICE, "response has no `results` list"))?;

        tracing::debug!("Unsplash returned {} photo(s) for {:?}", results.len(), query);
        Ok(results.into_iter().take(MAX_IMAGES).map(|photo| photo.urls.regular).collect())
    }
}
