use thiserror::Error;

#[derive(Error, Debug)]
pub enum BulletinError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    // Parsing errors
    #[error("Payload decoding failed: {0}")]
    Decode(String),

    // Sync errors
    #[error("A sync is already in progress")]
    AlreadyInProgress,

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Notification errors
    #[error("Notification failed: {0}")]
    Notification(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BulletinError {
    /// True for failures that happened while talking to the remote endpoint
    pub fn is_transport(&self) -> bool {
        matches!(self, BulletinError::Http(_) | BulletinError::Transport(_))
    }
}

impl From<serde_json::Error> for BulletinError {
    fn from(err: serde_json::Error) -> Self {
        BulletinError::Decode(err.to_string())
    }
}

pub type BulletinResult<T> = Result<T, BulletinError>;
