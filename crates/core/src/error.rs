#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid page origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Unsupported origin scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid image URL {url:?}: {reason}")]
    InvalidImageUrl { url: String, reason: String },

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
