pub mod backends;

pub use backends::{create_image_source, MAX_IMAGES};
pub use backends::google::GoogleImageSearch;
pub use backends::unsplash::UnsplashImageSearch;

pub mod prelude {
    pub use super::backends::create_image_source;
    pub use bg_core::{ImageSet, ImageSource, Result, Error};
}

#[cfg(test)]
pub(crate) mod test_utils;
