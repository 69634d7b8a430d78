use linkedin_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ServerError {
    /// Text shown to the MCP client when a tool call fails
    pub fn user_message(&self) -> String {
        match self {
            ServerError::Client(err @ ClientError::RequestFailed { detail, .. }) => match detail {
                Some(detail) => format!("{}\nDetails: {}", err, detail),
                None => err.to_string(),
            },
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
