//! HTTP error envelope
//!
//! Every failure leaves the server as `{"status": "error", "message": ...}`.
//! Handlers return [`ApiError`]; anything salvo produces on its own (bad JSON,
//! unknown routes, panics) is rewritten by the [`catcher`].

use salvo::{
    catcher::Catcher,
    http::ResBody,
    oapi::{self, Components, EndpointOutRegister, Operation, ToSchema},
    prelude::*,
    writing::Scribe,
};
use serde::{Deserialize, Serialize};

const ERROR_STATUS: &str = "error";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorResponse {
    /// Always `error`
    pub status: String,

    /// Human readable reason
    pub message: String,
}

/// An HTTP status paired with the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiError {
    code: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// A 500 that never carries internal detail.
    pub(crate) fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> StatusCode {
        self.code
    }

    #[cfg(test)]
    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl From<StatusError> for ApiError {
    fn from(error: StatusError) -> Self {
        if error.code.is_server_error() {
            return Self::internal();
        }

        Self::new(error.code, error.brief)
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.code);
        res.render(Json(ErrorResponse {
            status: ERROR_STATUS.to_string(),
            message: self.message,
        }));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        let documented = [
            (StatusCode::BAD_REQUEST, "Bad Request"),
            (StatusCode::UNAUTHORIZED, "Unauthorized"),
            (StatusCode::NOT_FOUND, "Not Found"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ];

        for (code, description) in documented {
            operation.responses.insert(
                code.as_str(),
                oapi::Response::new(description)
                    .add_content("application/json", ErrorResponse::to_schema(components)),
            );
        }
    }
}

/// Catcher that wraps framework generated errors in the error envelope.
pub(crate) fn catcher() -> Catcher {
    Catcher::default().hoop(error_envelope)
}

#[handler]
async fn error_envelope(res: &mut Response, ctrl: &mut FlowCtrl) {
    let code = res.status_code.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let error = match res.take_body() {
        ResBody::Error(error) => ApiError::from(error),
        _ => StatusError::from_code(code).map_or_else(ApiError::internal, ApiError::from),
    };

    error.render(res);

    ctrl.skip_rest();
}
