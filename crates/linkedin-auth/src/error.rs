pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("Not authenticated: no access token has been granted yet")]
    Unauthenticated,

    #[error("LinkedIn authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Token request failed with status {status}: {body}")]
    TokenRequest { status: u16, body: String },

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
