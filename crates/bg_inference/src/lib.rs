pub mod models;

pub use models::create_generator;
pub use models::openai::{token_budget, OpenAiGenerator, CONTEXT_TOKEN_CEILING};

pub mod prelude {
    pub use super::models::create_generator;
    pub use bg_core::{ContentGenerator, GenerationResult, Result, Error};
}

#[cfg(test)]
pub(crate) mod test_utils;
