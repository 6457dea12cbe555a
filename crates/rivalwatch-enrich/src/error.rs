/// Errors that can occur when talking to the company-data provider.
///
/// Callers on the request path rarely see these: [`crate::fetch_profile`]
/// and [`crate::fetch_similar`] log them and fall back to empty results.
///
/// # Examples
///
/// ```rust
/// use rivalwatch_enrich::error::EnrichError;
///
/// let err = EnrichError::InvalidDomain("not a domain".to_string());
/// assert!(err.to_string().contains("not a domain"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// The domain failed validation before any request was sent.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Non-2xx status from the provider.
    #[error("{provider} API HTTP error: status={status}, body={body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnrichError>;
