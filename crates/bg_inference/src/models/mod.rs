use std::sync::Arc;
use std::time::Duration;
use bg_core::config::GenerationConfig;
use bg_core::{ContentGenerator, Result};

pub mod openai;

use openai::OpenAiGenerator;

pub fn create_generator(config: &GenerationConfig, timeout: Duration) -> Result<Arc<dyn ContentGenerator>> {
    let generator = OpenAiGenerator::new(config, timeout)?;
    tracing::debug!("Created {:?}", generator);
    Ok(Arc::new(generator))
}
