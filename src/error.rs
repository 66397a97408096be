// HTTP error kinds and rejection recovery

use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::models::{ChatReplyResponse, ErrorResponse};
use crate::service::ChatError;
use crate::store::StoreError;

pub const NO_INPUT_REPLY: &str = "⚠️ No input or file received.";
pub const UNSUPPORTED_FILE_REPLY: &str = "⚠️ Unsupported file type.";
pub const PROCESSING_ERROR_REPLY: &str = "⚠️ Error processing your message.";

/// Error kinds surfaced over HTTP
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400, a required field is missing
    #[error("{0}")]
    InvalidInput(String),

    /// 400, upload with no extractor
    #[error("Unsupported file type")]
    UnsupportedFileType,

    /// 404, unknown session, message or file
    #[error("{0}")]
    NotFound(String),

    /// 500, detail is logged and never returned
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::UnsupportedFileType => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{"error": ...}` body used by the session endpoints
    pub fn into_reply(self) -> warp::reply::Response {
        let status = self.status();
        warp::reply::with_status(
            warp::reply::json(&ErrorResponse {
                error: self.to_string(),
            }),
            status,
        )
        .into_response()
    }

    /// `{"reply": ...}` body used by the chat endpoint
    pub fn into_chat_reply(self) -> warp::reply::Response {
        let reply = match &self {
            ApiError::InvalidInput(_) => NO_INPUT_REPLY,
            ApiError::UnsupportedFileType => UNSUPPORTED_FILE_REPLY,
            ApiError::NotFound(_) | ApiError::Internal => PROCESSING_ERROR_REPLY,
        };
        warp::reply::with_status(
            warp::reply::json(&ChatReplyResponse {
                reply: reply.to_string(),
                chat_id: None,
            }),
            self.status(),
        )
        .into_response()
    }
}

impl warp::reject::Reject for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound("Chat session not found".to_string()),
            StoreError::InvalidArgument(message) => ApiError::InvalidInput(message),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidInput => ApiError::InvalidInput(err.to_string()),
            ChatError::UnsupportedFileType { .. } => ApiError::UnsupportedFileType,
            ChatError::Upload(_) | ChatError::Extraction(_) | ChatError::Llm(_) => {
                ApiError::Internal
            }
        }
    }
}

/// Convert rejections into JSON error responses
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let api_error = if err.is_not_found() {
        ApiError::NotFound("Not found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        api_error.clone()
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        ApiError::InvalidInput(format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        ApiError::InvalidInput("Invalid query string".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(status_reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"));
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(status_reply(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported media type",
        ));
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(status_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        ));
    } else {
        error!(rejection = ?err, "unhandled rejection");
        ApiError::Internal
    };

    if api_error.status().is_client_error() {
        warn!(status = api_error.status().as_u16(), error = %api_error, "request rejected");
    }
    Ok(api_error.into_reply())
}

fn status_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}
