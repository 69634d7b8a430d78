use crate::types::{GrantRequest, TokenResponse};
use crate::{AuthError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default LinkedIn OAuth base URL
pub const DEFAULT_AUTH_BASE: &str = "https://www.linkedin.com/oauth/v2";

/// An OAuth token endpoint able to answer client-credentials and refresh grants
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn request_token(&self, grant: &GrantRequest) -> Result<TokenResponse>;
}

/// Token endpoint speaking the OAuth 2 form-encoded `accessToken` shape over HTTP
pub struct HttpTokenEndpoint {
    http_client: Client,
    token_url: String,
}

impl HttpTokenEndpoint {
    /// Create an endpoint rooted at `auth_base` (for example `https://www.linkedin.com/oauth/v2`)
    pub fn new(auth_base: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            token_url: format!("{}/accessToken", auth_base.trim_end_matches('/')),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn request_token(&self, grant: &GrantRequest) -> Result<TokenResponse> {
        info!("Requesting access token ({})", grant.grant_type());
        debug!("Token request to {}", self.token_url);

        let response = self
            .http_client
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&grant.form_params())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!("Token request failed: {} - {}", status, error_body);
            return Err(AuthError::TokenRequest {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let body = response.text().await?;
        let token_response: TokenResponse = serde_json::from_str(&body)?;

        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse(
                "access_token is empty".to_string(),
            ));
        }
        token_response.expires_at(Utc::now())?;

        debug!(
            "Token granted, expires in {}s, refresh token issued: {}",
            token_response.expires_in,
            token_response.refresh_token.is_some()
        );
        Ok(token_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_credentials() -> GrantRequest {
        GrantRequest::ClientCredentials {
            client_id: "client-123".to_string(),
            client_secret: "s3cret".to_string(),
        }
    }

    #[test]
    fn test_token_url_trims_trailing_slash() {
        let endpoint = HttpTokenEndpoint::new("https://auth.example.com/oauth/v2/", None).unwrap();
        assert_eq!(endpoint.token_url(), "https://auth.example.com/oauth/v2/accessToken");
    }

    #[tokio::test]
    async fn test_client_credentials_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/accessToken"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-123"))
            .and(body_string_contains("client_secret=s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint =
            HttpTokenEndpoint::new(&format!("{}/oauth/v2", server.uri()), None).unwrap();
        let token = endpoint.request_token(&client_credentials()).await.unwrap();

        assert_eq!(token.access_token, "T1");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_grant_sends_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accessToken"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=R1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T2",
                "expires_in": 60,
                "refresh_token": "R2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(&server.uri(), None).unwrap();
        let grant = GrantRequest::RefreshToken {
            client_id: "client-123".to_string(),
            client_secret: "s3cret".to_string(),
            refresh_token: "R1".to_string(),
        };
        let token = endpoint.request_token(&grant).await.unwrap();

        assert_eq!(token.access_token, "T2");
        assert_eq!(token.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accessToken"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(&server.uri(), None).unwrap();
        let err = endpoint.request_token(&client_credentials()).await.unwrap_err();

        match err {
            AuthError::TokenRequest { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_expires_in_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accessToken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "T1" })),
            )
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(&server.uri(), None).unwrap();
        let err = endpoint.request_token(&client_credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::Json(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_expires_in_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accessToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T1",
                "expires_in": 10_000_000_000_000_000u64
            })))
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(&server.uri(), None).unwrap();
        let err = endpoint.request_token(&client_credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidTokenResponse(_)));
    }
}
