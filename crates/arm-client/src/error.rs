use thiserror::Error;

pub type Result<T, E = ClientError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("robot API error: {0}")]
    Api(String),
}
