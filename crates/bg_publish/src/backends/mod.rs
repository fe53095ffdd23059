pub mod memory;
pub mod shopify;
