use thiserror::Error;

/// Errors from the OMDb API client.
///
/// A logical "not found" is not an error: it comes back as a `Failed`
/// outcome. These variants cover calls that could not complete.
#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}
