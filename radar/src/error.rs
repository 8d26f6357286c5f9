use thiserror::Error;

/// Failures talking to the record store. Always transient from the point of
/// view of the exporter, which waits and tries again.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("state error: {0}")]
    State(#[from] db_store::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Data that cannot be interpreted. The affected record or session is
/// skipped, or the inbound request rejected.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("location: {0}")]
    Location(#[from] olc_geo::DecodeError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("{0} out of range")]
    OutOfRange(&'static str),
}

/// A submission could not be delivered. The export cursor is left where it
/// was so the batch is offered again.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sink rejected submission with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}
