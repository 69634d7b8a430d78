//! Request dispatcher for the LinkedIn REST API
//!
//! Every operation funnels through [`LinkedInClient::issue`], which obtains a
//! valid token from the credential manager, attaches the standard headers,
//! counts the request and maps failures into [`ClientError::RequestFailed`].

use crate::error::{ClientError, Result};
use crate::metrics::{MetricsSnapshot, RequestMetrics};
use crate::request::OutboundRequest;
use crate::types::{GetProfileParams, SearchJobsParams, SearchPeopleParams, SendMessageParams};
use crate::ClientConfig;
use chrono::Utc;
use linkedin_auth::CredentialManager;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, Instrument};
use url::Url;

/// Header carrying the per-process request sequence number
pub const REQUEST_ID_HEADER: &str = "x-linkedin-mcp-request-id";

pub struct LinkedInClient {
    http_client: Client,
    credentials: Arc<CredentialManager>,
    api_base: String,
    metrics: RequestMetrics,
}

impl LinkedInClient {
    /// Create a dispatcher bound to `credentials`
    pub fn new(config: ClientConfig, credentials: Arc<CredentialManager>) -> Result<Self> {
        // Fail early on an unusable base URL
        Url::parse(&config.api_base)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| ClientError::RequestFailed {
            endpoint: config.api_base.clone(),
            status: None,
            detail: None,
            message: format!("failed to build HTTP client: {}", e),
        })?;

        info!("LinkedIn client initialized for {}", config.api_base);

        Ok(Self {
            http_client,
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            metrics: RequestMetrics::new(),
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    /// Issue one authenticated call and return the parsed response body.
    ///
    /// Every call is counted, including ones that fail before reaching the
    /// network.
    pub async fn issue(&self, request: OutboundRequest) -> Result<Value> {
        let request_number = self.metrics.record(Utc::now());

        if request.path.trim().is_empty() {
            return Err(ClientError::invalid_argument("request path must not be empty"));
        }

        let span = tracing::info_span!(
            "linkedin_request",
            correlation_id = %request.correlation_id,
            request_number,
            method = ?request.method,
            path = %request.path,
        );

        self.dispatch(&request, request_number).instrument(span).await
    }

    async fn dispatch(&self, request: &OutboundRequest, request_number: u64) -> Result<Value> {
        self.credentials.ensure_valid().await?;
        let token = self.credentials.current_token()?;
        let url = self.build_url(request)?;

        let headers = self.build_headers(&token, request_number)?;

        debug!("Sending request #{} to {}", request_number, url);

        let mut builder = self
            .http_client
            .request(request.method.into(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("LinkedIn API request to {} failed: {}", request.path, e);
                return Err(ClientError::RequestFailed {
                    endpoint: request.path.clone(),
                    status: None,
                    detail: None,
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| ClientError::RequestFailed {
            endpoint: request.path.clone(),
            status: Some(status.as_u16()),
            detail: None,
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            error!(
                "LinkedIn API request to {} failed: {} - {}",
                request.path, status, text
            );
            return Err(ClientError::RequestFailed {
                endpoint: request.path.clone(),
                status: Some(status.as_u16()),
                detail: parse_detail(&text),
                message: format!("HTTP {}", status),
            });
        }

        info!("LinkedIn API request successful: {} (#{})", request.path, request_number);
        parse_body(&request.path, status.as_u16(), &text)
    }

    pub async fn search_people(&self, params: &SearchPeopleParams) -> Result<Value> {
        self.issue(params.to_request()).await
    }

    pub async fn get_profile(&self, params: &GetProfileParams) -> Result<Value> {
        let request = params.to_request()?;
        self.issue(request).await
    }

    pub async fn search_jobs(&self, params: &SearchJobsParams) -> Result<Value> {
        self.issue(params.to_request()).await
    }

    pub async fn send_message(&self, params: &SendMessageParams) -> Result<Value> {
        let request = params.to_request()?;
        self.issue(request).await
    }

    pub async fn get_my_profile(&self) -> Result<Value> {
        self.issue(OutboundRequest::get("/me")).await
    }

    pub async fn get_network_stats(&self) -> Result<Value> {
        let request = OutboundRequest::get("/connections")
            .with_param("q", "viewer")
            .with_param("start", "0")
            .with_param("count", "0");
        self.issue(request).await
    }

    /// Operational snapshot of the request counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn build_url(&self, request: &OutboundRequest) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        let not_a_base =
            || ClientError::invalid_argument(format!("{} is not a base URL", self.api_base));
        url.path_segments_mut()
            .map_err(|_| not_a_base())?
            .pop_if_empty()
            .extend(request.segments());

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn build_headers(&self, token: &str, request_number: u64) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-li-format", HeaderValue::from_static("json"));
        headers.insert("x-restli-protocol-version", HeaderValue::from_static("2.0.0"));
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from(request_number));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::invalid_argument(format!("Invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

fn parse_detail(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn parse_body(endpoint: &str, status: u16, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ClientError::RequestFailed {
        endpoint: endpoint.to_string(),
        status: Some(status),
        detail: Some(Value::String(text.to_string())),
        message: format!("invalid JSON response: {}", e),
    })
}
