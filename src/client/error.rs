use std::fmt;

use crate::models::response::ValidationResponse;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Everything a client action can end in, short of success.
#[derive(Debug)]
pub enum ClientError {
    /// Blocked before any request was made.
    Validation(ValidationResponse),
    /// 401/403: wrong or missing admin password.
    Authorization(String),
    /// The request never produced a response.
    Network(String),
    /// Any other non-2xx response.
    Server { status: u16, detail: Option<String> },
    /// A 2xx response whose body did not match the expected shape.
    Decode(String),
}

impl ClientError {
    pub fn validation(field: &str, message: &str) -> Self {
        ClientError::Validation(ValidationResponse::new(field, message))
    }

    /// The text to show the user; `fallback` covers responses with no detail.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(v) => v.message.clone(),
            ClientError::Authorization(detail) => detail.clone(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::Server { detail: None, .. } | ClientError::Decode(_) => {
                fallback.to_string()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Validation(v) => write!(f, "Validation error on {}: {}", v.field, v.message),
            ClientError::Authorization(detail) => write!(f, "Authorization error: {}", detail),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Server { status, detail } => write!(
                f,
                "Server error {}: {}",
                status,
                detail.as_deref().unwrap_or("no detail")
            ),
            ClientError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ValidationResponse> for ClientError {
    fn from(v: ValidationResponse) -> Self {
        ClientError::Validation(v)
    }
}
