/// Errors from a text-generation backend.
///
/// # Examples
///
/// ```rust
/// use rivalwatch_ai::error::AiError;
///
/// let err = AiError::EmptyResponse { provider: "openai".into() };
/// assert!(err.to_string().contains("openai"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{provider} API HTTP error: status={status}, body={body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned no content")]
    EmptyResponse { provider: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
