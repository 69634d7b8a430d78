//! Parameter types for the LinkedIn operations and their request shaping

use crate::error::{ClientError, Result};
use crate::request::OutboundRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Subject attached to every message sent through this server
pub const MESSAGE_SUBJECT: &str = "LinkedIn MCP Message";

/// Message kind submitted with every message
pub const MESSAGE_TYPE: &str = "MEMBER_TO_MEMBER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPeopleParams {
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub current_company: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileParams {
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub urn_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJobsParams {
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    pub recipient_urn: String,
    pub message_body: String,
}

impl SearchPeopleParams {
    pub(crate) fn to_request(&self) -> OutboundRequest {
        let mut request = OutboundRequest::get("/search/people");
        request = push_opt(request, "keywords", &self.keywords);
        request = push_all(request, "currentCompany", &self.current_company);
        request = push_all(request, "industries", &self.industries);
        push_opt(request, "location", &self.location)
    }
}

impl SearchJobsParams {
    pub(crate) fn to_request(&self) -> OutboundRequest {
        let mut request = OutboundRequest::get("/search/jobs");
        request = push_opt(request, "keywords", &self.keywords);
        request = push_all(request, "companies", &self.companies);
        request = push_opt(request, "location", &self.location);
        push_all(request, "jobType", &self.job_type)
    }
}

impl GetProfileParams {
    /// The URN wins when both identifiers are supplied
    pub(crate) fn to_request(&self) -> Result<OutboundRequest> {
        if let Some(urn_id) = present(&self.urn_id) {
            if matches!(urn_id, "." | "..") {
                return Err(ClientError::invalid_argument(format!(
                    "urnId '{}' is not a profile identifier",
                    urn_id
                )));
            }
            return Ok(OutboundRequest::get("/people").with_segment(urn_id));
        }
        if let Some(public_id) = present(&self.public_id) {
            let segment = format!("(vanityName:{})", public_id);
            return Ok(OutboundRequest::get("/people").with_segment(segment));
        }
        Err(ClientError::invalid_argument(
            "either publicId or urnId must be provided",
        ))
    }
}

impl SendMessageParams {
    pub(crate) fn to_request(&self) -> Result<OutboundRequest> {
        if self.recipient_urn.trim().is_empty() {
            return Err(ClientError::invalid_argument("recipientUrn must not be empty"));
        }
        if self.message_body.trim().is_empty() {
            return Err(ClientError::invalid_argument("messageBody must not be empty"));
        }

        Ok(OutboundRequest::post(
            "/messages",
            json!({
                "recipients": [self.recipient_urn],
                "subject": MESSAGE_SUBJECT,
                "body": self.message_body,
                "messageType": MESSAGE_TYPE,
            }),
        ))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn push_opt(request: OutboundRequest, key: &str, value: &Option<String>) -> OutboundRequest {
    match present(value) {
        Some(value) => request.with_param(key, value),
        None => request,
    }
}

fn push_all(request: OutboundRequest, key: &str, values: &[String]) -> OutboundRequest {
    values
        .iter()
        .fold(request, |request, value| request.with_param(key, value.as_str()))
}
