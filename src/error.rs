use thiserror::Error;

/// Why an upload session ended without a server-issued handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("network failure: {0}")]
    Transport(String),

    #[error("server responded with status {0}")]
    Server(u16),

    #[error("malformed upload response: {0}")]
    ResponseParse(String),

    #[error("failed to read selected file: {0}")]
    Io(String),
}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Io(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no uploaded file to extract")]
    MissingUpload,

    #[error("extraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("extraction endpoint responded with status {status}")]
    Server { status: u16, body: String },
}
