use axum::{http::StatusCode, response::IntoResponse, Json};
use mongodb::error::ErrorKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::Error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }
}

/// Error payload returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error kind
    #[schema(example = "bad_request")]
    pub error: &'static str,
    /// Human-readable description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let server_code = err.server_code();

        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Database { source, context } => {
                let message = format!("{}: {}", context, source);

                if matches!(source.kind.as_ref(), ErrorKind::ServerSelection { .. }) {
                    return ApiError::ServiceUnavailable(message);
                }

                match server_code {
                    // NamespaceNotFound, IndexNotFound
                    Some(26) | Some(27) => ApiError::NotFound(message),
                    // NamespaceExists, IndexOptionsConflict, IndexKeySpecsConflict, DuplicateKey
                    Some(48) | Some(85) | Some(86) | Some(11000) => ApiError::Conflict(message),
                    // BadValue, FailedToParse, InvalidNamespace, bad pipeline stage
                    Some(2) | Some(9) | Some(73) | Some(40323) | Some(40324) => {
                        ApiError::BadRequest(message)
                    }
                    _ => {
                        tracing::error!(error = %message, "Unhandled database error");
                        ApiError::Internal(message)
                    }
                }
            }
            Error::Serialization { source, context } => {
                ApiError::Internal(format!("{}: {}", context, source))
            }
            Error::Config(msg) | Error::Transport(msg) | Error::Internal(msg) => {
                ApiError::Internal(msg)
            }
            Error::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}
