use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ScanError {
    /// True when the failure came from the server answering with a
    /// non-success status rather than from the transport.
    pub fn is_status(&self) -> bool {
        matches!(self, ScanError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
