use bytes::Bytes;
use thiserror::Error;

pub mod http;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("failed to get from {endpoint}: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("HTTP request failed with code {}", .0.as_u16())]
    Status(reqwest::StatusCode),
    #[error("failed to read target file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid target url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug)]
pub enum Target {
    Http(http::Config),
    File { path: String },
}

impl Target {
    pub fn describe(&self) -> String {
        match self {
            Self::Http(config) => http::redact(&config.url),
            Self::File { path } => path.clone(),
        }
    }

    /// Fetches `path` (relative to the target base) with an optional query.
    ///
    /// File targets ignore both and return the file contents, which is how
    /// recorded responses get replayed.
    pub async fn fetch(&self, path: &str, query: Option<&str>) -> Result<Bytes, TargetError> {
        match self {
            Self::Http(config) => config.fetch(path, query).await,
            Self::File { path } => Ok(Bytes::from(tokio::fs::read(path).await?)),
        }
    }
}
