use linkedin_auth::AuthError;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("LinkedIn API request to {endpoint} failed: {message}")]
    RequestFailed {
        endpoint: String,
        status: Option<u16>,
        detail: Option<Value>,
        message: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ClientError::InvalidArgument(msg.into())
    }

    /// Remote error payload carried by a failed request, if any
    pub fn detail(&self) -> Option<&Value> {
        match self {
            ClientError::RequestFailed { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
