use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("sql error: {0}")]
    SqlError(#[from] sqlx::Error),
    #[error("failed to decode value for {key}: {source}")]
    DecodeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key}: {source}")]
    EncodeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}
