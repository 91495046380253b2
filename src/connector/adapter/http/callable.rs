use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Message returned for every internal failure.
pub const INTERNAL_FAILURE_MESSAGE: &str = "Failed to analyze message.";

/// Callable request body. Clients send `{"data": {...}}`; a bare payload
/// object is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CallableRequest<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> CallableRequest<T> {
    pub fn into_data(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Successful callable response: `{"result": ...}`.
#[derive(Debug, Serialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallableErrorStatus {
    InvalidArgument,
    NotFound,
    Internal,
}

impl CallableErrorStatus {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error as seen by callers. Internal causes collapse to a generic message
/// and the failing stage; provider detail stays in the server logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableError {
    pub status: CallableErrorStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CallableError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: CallableErrorStatus::InvalidArgument,
            message: message.into(),
            details: None,
        }
    }
}

impl From<&DomainError> for CallableError {
    fn from(error: &DomainError) -> Self {
        match error {
            DomainError::InvalidArgument(message) => Self::invalid_argument(message.clone()),
            DomainError::ConversationNotFound(conversation_id) => Self {
                status: CallableErrorStatus::NotFound,
                message: format!("Conversation {conversation_id} does not exist."),
                details: None,
            },
            other => Self {
                status: CallableErrorStatus::Internal,
                message: INTERNAL_FAILURE_MESSAGE.to_string(),
                details: Some(other.stage_label().to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a CallableError,
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let status = self.status.http_status();
        (status, Json(ErrorEnvelope { error: &self })).into_response()
    }
}
