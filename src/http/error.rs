//! Handler failures reported through the request event path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error a handler can return to have its failure logged.
///
/// The client receives a plain error response; the failure message rides
/// along in the response extensions where `EventLayer` picks it up and
/// raises a `["handler", "error"]` request event on the internal channel.
#[derive(Debug)]
pub struct HandlerError {
    status: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E: std::error::Error> From<E> for HandlerError {
    fn from(err: E) -> Self {
        Self::new(err.to_string())
    }
}

/// Response extension marking a failed handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub message: String,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let reason = self.status.canonical_reason().unwrap_or("Error");
        let mut response = (self.status, reason).into_response();
        response.extensions_mut().insert(HandlerFailure {
            message: self.message,
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_carries_failure() {
        let response = HandlerError::new("oh no!").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<HandlerFailure>(),
            Some(&HandlerFailure {
                message: "oh no!".into()
            })
        );
    }

    #[test]
    fn test_from_std_error() {
        let err: HandlerError = std::io::Error::other("disk gone").into();
        assert_eq!(err.message(), "disk gone");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
