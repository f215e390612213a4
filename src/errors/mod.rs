use crate::models::response::ValidationResponse;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    DatabaseError(String),
    ValidationError(String),
    NotFound(String),
    Unauthorized(String),
    HashingError(String),
    InternalError(String),
    RenderError(String),
    Conflict(String),
}

// Display carries only the detail; the variant is reported separately as `error`.
impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "{}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized(msg) => write!(f, "{}", msg),
            ApiError::HashingError(msg) => write!(f, "Hashing error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::RenderError(msg) => write!(f, "Render error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "{}", msg),
        }
    }
}

/// Body of every non-2xx JSON response. Clients surface `detail` verbatim.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED_ERROR",
            ApiError::HashingError(_) => "HASHING_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::RenderError(_) => "RENDER_ERROR",
            ApiError::Conflict(_) => "CONFLICT_ERROR",
        }
    }
}

impl From<ValidationResponse> for ApiError {
    fn from(error: ValidationResponse) -> Self {
        ApiError::ValidationError(error.message)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DatabaseError(format!("stored record is malformed: {}", err))
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::RenderError(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::InternalError(format!("Blocking task failed: {}", err))
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            detail: self.to_string(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RenderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_facing_variants_keep_detail_verbatim() {
        let err = ApiError::Unauthorized("Invalid password".to_string());
        assert_eq!(err.to_string(), "Invalid password");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = ApiError::DatabaseError("disk full".to_string());
        assert_eq!(err.to_string(), "Database error: disk full");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_response_becomes_bad_request() {
        let err: ApiError = ValidationResponse {
            field: "bloodGroup".to_string(),
            message: "Please select a blood group".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Please select a blood group");
    }
}
