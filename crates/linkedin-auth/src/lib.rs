//! LinkedIn OAuth credential lifecycle
//!
//! Holds the client identity and the cached token pair, performs
//! client-credentials and refresh grants, and hands out access tokens that
//! stay valid beyond a five minute safety margin.

pub mod credential_manager;
pub mod endpoint;
pub mod error;
pub mod types;

pub use credential_manager::{CredentialManager, SAFETY_MARGIN_SECS};
pub use endpoint::{HttpTokenEndpoint, TokenEndpoint, DEFAULT_AUTH_BASE};
pub use error::{AuthError, Result};
pub use types::*;
