//! Response - Raw transport envelope and decoded API responses
//!
//! Transport clients hand back both the decoded model and the raw HTTP
//! envelope. The envelope is never interpreted by the poller; it is carried
//! along so that failures can name the status code and request id.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Raw HTTP envelope of a management API response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    /// Value of the `x-ms-request-id` header, if any
    pub request_id: Option<String>,
    pub body: Option<String>,
}

impl RawResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            request_id: None,
            body: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Short description used in error messages, e.g. `status 200, request id abc`
    pub fn summary(&self) -> String {
        match &self.request_id {
            Some(id) => format!("status {}, request id {}", self.status_code, id),
            None => format!("status {}", self.status_code),
        }
    }
}

/// Errors raised by a transport client for a single request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-success status code
    #[error("unexpected status {status_code}: {message}")]
    Status { status_code: u16, message: String },

    /// The request never produced a response (connection reset, DNS, auth token refresh...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The body could not be decoded into the expected model
    #[error("decoding response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status_code,
            message: message.into(),
        }
    }

    /// HTTP status code, when the service responded at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Decoded model plus the raw envelope it came from
///
/// `model` is `None` when the service returned no body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub model: Option<T>,
    pub http: RawResponse,
}

impl<T> ApiResponse<T> {
    pub fn new(model: Option<T>, http: RawResponse) -> Self {
        Self { model, http }
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode a raw response into a typed one
    ///
    /// Non-success status codes become [`ApiError::Status`]. An absent or blank
    /// body yields `model: None` rather than an error.
    pub fn decode(http: RawResponse) -> Result<Self, ApiError> {
        if !http.is_success() {
            return Err(ApiError::status(
                http.status_code,
                http.body.clone().unwrap_or_default(),
            ));
        }

        let model = match http.body.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(body) => Some(
                serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?,
            ),
        };

        Ok(Self { model, http })
    }
}
