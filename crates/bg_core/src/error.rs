use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error from {service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Insertion point not found: need 2 <{anchor}> elements, found {found}")]
    InsertionPointNotFound { anchor: &'static str, found: usize },

    #[error("Missing image at index {index} (image set has {available})")]
    MissingImage { index: usize, available: usize },

    #[error("No collection found on the content backend")]
    NoCollectionFound,

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// True for failures that happen on the wire or in a remote payload.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::upstream("google", "status 403");
        assert_eq!(err.to_string(), "Upstream error from google: status 403");
        assert!(err.is_upstream());

        let err = Error::InsertionPointNotFound { anchor: "p", found: 1 };
        assert_eq!(
            err.to_string(),
            "Insertion point not found: need 2 <p> elements, found 1"
        );
        assert!(!err.is_upstream());
    }
}
