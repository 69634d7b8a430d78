use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, Result};

/// Environment variable holding the OAuth client id
pub const CLIENT_ID_ENV: &str = "LINKEDIN_CLIENT_ID";

/// Environment variable holding the OAuth client secret
pub const CLIENT_SECRET_ENV: &str = "LINKEDIN_CLIENT_SECRET";

/// OAuth client identity. Both values are validated non-empty on creation.
#[derive(Clone)]
pub struct ClientIdentity {
    client_id: String,
    client_secret: String,
}

impl ClientIdentity {
    /// Create a client identity, rejecting absent or empty values
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        let client_id = non_empty(client_id).ok_or(AuthError::MissingCredential(CLIENT_ID_ENV))?;
        let client_secret =
            non_empty(client_secret).ok_or(AuthError::MissingCredential(CLIENT_SECRET_ENV))?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Grant sent to the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRequest {
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl GrantRequest {
    pub fn grant_type(&self) -> &'static str {
        match self {
            GrantRequest::ClientCredentials { .. } => "client_credentials",
            GrantRequest::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form parameters for the `accessToken` endpoint
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        match self {
            GrantRequest::ClientCredentials {
                client_id,
                client_secret,
            } => vec![
                ("grant_type", self.grant_type()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
            GrantRequest::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => vec![
                ("grant_type", self.grant_type()),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
        }
    }
}

/// OAuth 2.0 token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry of a token received at `issued_at`.
    ///
    /// Lifetimes that do not fit a timestamp are rejected as
    /// [`AuthError::InvalidTokenResponse`].
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Result<DateTime<Utc>> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidTokenResponse(format!(
                    "expires_in {} is out of range",
                    self.expires_in
                ))
            })
    }
}

/// Cached grant state for one client identity
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    /// Apply a grant response received at `issued_at`.
    ///
    /// The refresh token is only replaced when the server sent a new one.
    /// A response with an unusable lifetime leaves the state untouched.
    pub fn apply(&mut self, response: TokenResponse, issued_at: DateTime<Utc>) -> Result<()> {
        let expires_at = response.expires_at(issued_at)?;
        self.access_token = Some(response.access_token);
        self.expires_at = Some(expires_at);
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when no expiry is known or it falls within `margin` of `now`
    pub fn is_expiring_soon_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now + margin,
            None => true,
        }
    }

    /// True when an access token is cached and outside the safety margin
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.access_token.is_some() && !self.is_expiring_soon_at(now, margin)
    }
}

/// Secret-free view of the credential state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub authenticated: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub has_refresh_token: bool,
    pub grant_count: u64,
    pub last_grant_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_requires_both_values() {
        let err = ClientIdentity::new(None, Some("secret".into())).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential(CLIENT_ID_ENV)));

        let err = ClientIdentity::new(Some("id".into()), Some("   ".into())).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential(CLIENT_SECRET_ENV)));

        let identity = ClientIdentity::new(Some("id".into()), Some("secret".into())).unwrap();
        assert_eq!(identity.client_id(), "id");
        let debug = format!("{:?}", identity);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"secret\""));
    }

    #[test]
    fn test_refresh_form_params() {
        let grant = GrantRequest::RefreshToken {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "r1".into(),
        };

        let params = grant.form_params();
        assert!(params.contains(&("grant_type", "refresh_token")));
        assert!(params.contains(&("refresh_token", "r1")));
        assert!(params.contains(&("client_secret", "secret")));
    }

    #[test]
    fn test_apply_keeps_refresh_token_when_absent() {
        let now = Utc::now();
        let mut state = TokenState::default();
        let first = TokenResponse {
            access_token: "T1".into(),
            expires_in: 3600,
            refresh_token: Some("R1".into()),
            scope: None,
        };
        let second = TokenResponse {
            access_token: "T2".into(),
            expires_in: 60,
            refresh_token: None,
            scope: None,
        };

        state.apply(first, now).unwrap();
        state.apply(second, now).unwrap();

        assert_eq!(state.access_token.as_deref(), Some("T2"));
        assert_eq!(state.refresh_token.as_deref(), Some("R1"));
        assert_eq!(state.expires_at, Some(now + Duration::seconds(60)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_rejected() {
        let now = Utc::now();
        let mut state = TokenState::default();

        for expires_in in [10_000_000_000_000_000, u64::MAX] {
            let err = state
                .apply(
                    TokenResponse {
                        access_token: "T1".into(),
                        expires_in,
                        refresh_token: Some("R1".into()),
                        scope: None,
                    },
                    now,
                )
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidTokenResponse(_)));
        }

        assert!(state.access_token.is_none());
        assert!(state.refresh_token.is_none());
        assert!(state.expires_at.is_none());
    }

    #[test]
    fn test_expiring_soon_without_expiry() {
        let state = TokenState::default();
        assert!(state.is_expiring_soon_at(Utc::now(), Duration::minutes(5)));
        assert!(!state.is_fresh_at(Utc::now(), Duration::minutes(5)));
    }
}
