use std::sync::Arc;
use std::time::Duration;
use bg_core::config::ImageSearchConfig;
use bg_core::{Error, ImageSource, Result};

pub mod google;
pub mod unsplash;

/// Upper bound on URLs kept from a single search.
pub const MAX_IMAGES: usize = 10;

pub fn create_image_source(config: &ImageSearchConfig, timeout: Duration) -> Result<Arc<dyn ImageSource>> {
    let source: Arc<dyn ImageSource> = match config {
        ImageSearchConfig::Google { api_key, engine_id } => {
            Arc::new(google::GoogleImageSearch::new(api_key, engine_id, timeout)?)
        }
        ImageSearchConfig::Unsplash { access_key } => {
            Arc::new(unsplash::UnsplashImageSearch::new(access_key, timeout)?)
        }
    };
    Ok(source)
}

pub(crate) fn search_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<url::Url> {
    url::Url::parse_with_params(&format!("{}{}", base, path), params)
        .map_err(|e| Error::InvalidRequest(format!("Failed to build search URL: {}", e)))
}

/// Read a response body, turning non-success statuses into upstream errors.
pub(crate) async fn success_body(service: &'static str, response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::upstream(service, format!("status {}: {}", status, body)));
    }
    Ok(body)
}
