use std::sync::Arc;
use std::time::Duration;
use bg_core::{Config, Error, Publisher, Result, RunMode};

pub mod backends;

pub use backends::memory::MemoryPublisher;
pub use backends::shopify::ShopifyPublisher;

/// Pick the backend for the configured run mode.
pub fn create_publisher(config: &Config, timeout: Duration) -> Result<Arc<dyn Publisher>> {
    match config.run_mode {
        RunMode::Publish => {
            let shop = config.shop.as_ref().ok_or_else(|| {
                Error::Configuration("SHOP and SHOP_API_KEY are required to publish".to_string())
            })?;
            Ok(Arc::new(ShopifyPublisher::new(shop, timeout)?))
        }
        RunMode::DryRun => Ok(Arc::new(MemoryPublisher::new())),
    }
}

pub mod prelude {
    pub use super::create_publisher;
    pub use bg_core::{PublishRequest, PublishedArticle, Publisher, Result, Error};
}

#[cfg(test)]
pub(crate) mod test_utils;
