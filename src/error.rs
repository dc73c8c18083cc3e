use std::path::PathBuf;

/// Missing or malformed local configuration. Always fatal, raised before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read playlist config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse playlist config {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("No playlist config found (looked for {0})")]
    NotFound(String),
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    #[error("Invalid playlist entry #{index}: {reason}")]
    InvalidPlaylist { index: usize, reason: String },
    #[error("Playlist name `{0}` is used more than once")]
    DuplicatePlaylist(String),
}

/// Failure to retrieve the live item list of one playlist. Recovered by skipping it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to send http request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Playlist API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse playlist response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

/// A stored snapshot that cannot be interpreted at all.
/// Recovered by treating the document as empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Snapshot contains a NUL byte at line {line}")]
    Binary { line: usize },
    #[error("Snapshot has a second playlist heading at line {line}")]
    MultipleHeadings { line: usize },
}

/// Document store read or write failure. Always fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to send http request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Document store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse document store response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

/// Fatal errors surfaced by the sync driver.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to set up playlist client: {0}")]
    SourceSetup(#[source] FetchError),
    #[error("Failed to set up document store client: {0}")]
    StoreSetup(#[source] StoreError),
    #[error("Failed to read stored snapshots: {0}")]
    StoreRead(#[source] StoreError),
    #[error("Failed to write updated snapshots: {0}")]
    StoreWrite(#[source] StoreError),
}

/// Whether an HTTP status is worth another attempt.
pub fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect(),
            FetchError::Status { status, .. } => is_transient_status(*status),
            FetchError::Decode(_) | FetchError::Url(_) => false,
        }
    }
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http(e) => e.is_timeout() || e.is_connect(),
            StoreError::Status { status, .. } => is_transient_status(*status),
            StoreError::Decode(_) | StoreError::Url(_) => false,
        }
    }
}
