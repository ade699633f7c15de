use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid document name: {0:?}")]
    InvalidName(String),
    #[error("unknown document key: {0}")]
    UnknownDocument(String),
    #[error("invalid catalog: {0}")]
    Catalog(String),
    #[error("storage root unavailable: {0}")]
    Root(String),
    #[error("failed to encode document {name}: {message}")]
    Serialize { name: String, message: String },
    #[error("failed to persist document {name}: {message}")]
    Persist { name: String, message: String },
}

impl ServiceError {
    pub fn persist(name: &str, message: impl Into<String>) -> Self {
        Self::Persist { name: name.to_string(), message: message.into() }
    }
}
