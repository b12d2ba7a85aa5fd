use actix_web::{error::PayloadError, http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Failures of the upstream completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream response contained no reply text")]
    EmptyReply,
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Every way a chat request can fail.
///
/// `Display` carries diagnostic detail for the server log; the HTTP body
/// only ever contains [`ChatError::public_message`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("OPENROUTER_API_KEY is not configured")]
    MissingApiKey,
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
    #[error("failed to read request body: {0}")]
    BodyRead(#[from] PayloadError),
    #[error("invalid message")]
    InvalidMessage,
    #[error("history is not a list")]
    MalformedHistory,
    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

impl ChatError {
    pub fn public_message(&self) -> &'static str {
        match self {
            ChatError::MethodNotAllowed => "Method not allowed",
            ChatError::MissingApiKey => "API key not configured",
            ChatError::PayloadTooLarge => "Payload too large",
            ChatError::InvalidMessage => "Invalid message",
            ChatError::BodyRead(_) | ChatError::MalformedHistory | ChatError::Upstream(_) => {
                GENERIC_FAILURE
            }
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ChatError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ChatError::InvalidMessage => StatusCode::BAD_REQUEST,
            ChatError::MissingApiKey
            | ChatError::BodyRead(_)
            | ChatError::MalformedHistory
            | ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_detail_stays_out_of_the_public_message() {
        let err = ChatError::from(CompletionError::Status {
            status: 402,
            body: "insufficient credits for sk-or-abc".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("insufficient credits"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ChatError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ChatError::InvalidMessage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ChatError::MissingApiKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ChatError::MissingApiKey.public_message(), "API key not configured");
        assert_eq!(
            ChatError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ChatError::MalformedHistory.public_message(),
            GENERIC_FAILURE
        );
    }
}
