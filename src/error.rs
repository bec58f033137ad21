use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{operation} failed with status {status}: {message}")]
    Session {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("{operation} request failed: {source}")]
    Io {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("The call to {operation} was unsuccessful: \"{message}\"")]
    Api { operation: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotifierError {
    pub(crate) fn io(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;
