use thiserror::Error;

#[derive(Debug, Error)]
pub enum MastodonError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, MastodonError>;
