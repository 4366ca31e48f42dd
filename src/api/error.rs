use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// An HTTP error response: status code plus the message rendered as
/// `{"error": message, "status": code}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// An error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// Maps an [`ErrorKind`] to the status code the API answers with.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientFunds => StatusCode::CONFLICT,
        ErrorKind::InvalidAmount | ErrorKind::InvalidTransfer | ErrorKind::InvalidInput => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if let Error::Upstream { message } = &err {
            error!("Upstream failure: {}", message);
            return Self::new(StatusCode::BAD_GATEWAY, "Chat service unavailable");
        }

        let status = status_for(err.kind());
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Driver messages stay in the logs
            error!("Request failed: {}", err);
            return Self::new(status, "Internal server error");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16(),
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                Error::AccountNotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                Error::InsufficientFunds {
                    current: 1,
                    required: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                Error::InvalidAmount { amount: "0".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::InvalidTransfer { reason: "x".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Unauthorized {
                    message: "x".into(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                Error::Upstream {
                    message: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = ApiError::from(Error::Database(DbErr::Custom("disk I/O error".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
