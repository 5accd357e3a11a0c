use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtprotoError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not authenticated: call create_session first")]
    NotAuthenticated,

    #[error("no conversation found for member {0}")]
    ConvoNotFound(String),
}

pub type Result<T> = std::result::Result<T, AtprotoError>;
