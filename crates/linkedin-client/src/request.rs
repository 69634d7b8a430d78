use serde_json::Value;
use uuid::Uuid;

/// HTTP method of an outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn is_read_only(self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A single call against the LinkedIn REST API
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    /// Path relative to the API base, as shown in logs and errors
    pub path: String,
    segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub correlation_id: Uuid,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            method,
            path,
            segments,
            query: Vec::new(),
            body: None,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// Append one path segment taken verbatim. `/`, `?`, `#` and `%` inside
    /// it are percent-encoded when the URL is built.
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        self.path = format!("{}/{}", self.path.trim_end_matches('/'), segment);
        self.segments.push(segment);
        self
    }

    /// Unencoded path segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append a query parameter; repeated keys keep insertion order
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
