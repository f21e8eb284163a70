pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The profile page did not carry a locatable embedded state blob.
    #[error("insufficient data in profile page")]
    InsufficientData,

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("credentials: {0}")]
    Credentials(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
