#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream answered {0}")]
    Status(reqwest::StatusCode),
    #[error("reply is not hex: {0}")]
    Decode(#[from] hex::FromHexError),
    #[error("udp send failed: {0}")]
    Send(#[from] std::io::Error),
}
