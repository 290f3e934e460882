use uuid::Uuid;

use crate::gateway_api::error_recorder::{ErrorRecorder, IntoGatewayError};
use crate::gateway_api::gateway_error::{GatewayError, GatewayErrorDetail};
use crate::storage::StorageError;

pub type HandlerResult<T> = Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to get database connection: {0}")]
    Connection(String),

    #[error("Database operation failed: {0}")]
    Operation(String),

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Connection(_) => "connection_failure",
            Error::Operation(_) => "operation_failure",
            Error::Validation { .. } => "validation_failure",
        }
    }

    /// Count the failure against the handler and turn it into a response.
    pub fn record(self, recorder: &ErrorRecorder<'_>) -> GatewayError {
        recorder.record(self.code(), self)
    }

    pub fn to_gateway_error(self, request_id: &Uuid) -> GatewayError {
        let code = self.code().to_string();
        match self {
            Error::Connection(e) => GatewayError::internal_server_error(
                "Database connection failed".to_string(),
                vec![GatewayErrorDetail {
                    field: None,
                    code,
                    message: format!("Failed to get database connection: {e}"),
                    suggestion: "Please try again later".to_string(),
                }],
                request_id.to_string(),
            ),
            Error::Operation(e) => GatewayError::internal_server_error(
                "Database operation failed".to_string(),
                vec![GatewayErrorDetail {
                    field: None,
                    code,
                    message: e,
                    suggestion: "Please try again later".to_string(),
                }],
                request_id.to_string(),
            ),
            Error::Validation { field, message } => GatewayError::bad_request(
                message.clone(),
                vec![GatewayErrorDetail {
                    field: Some(field.to_string()),
                    code,
                    message,
                    suggestion: "Check the request parameters".to_string(),
                }],
                request_id.to_string(),
            ),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Connection(e) => Error::Connection(e),
            StorageError::Operation(e) => Error::Operation(e.to_string()),
        }
    }
}

impl IntoGatewayError for Error {
    fn into_gateway_error(self, request_id: &Uuid) -> GatewayError {
        self.to_gateway_error(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn storage_failures_are_server_errors() {
        let request_id = Uuid::new_v4();

        let err = Error::from(StorageError::Connection("refused".into()));
        assert_eq!(err.code(), "connection_failure");
        assert_eq!(
            err.to_gateway_error(&request_id).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = Error::from(StorageError::Operation(
            diesel::result::Error::NotFound,
        ));
        assert_eq!(err.code(), "operation_failure");
        assert_eq!(
            err.to_gateway_error(&request_id).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let err = Error::Validation {
            field: "hours",
            message: "hours is out of range".to_string(),
        };

        let gateway_error = err.to_gateway_error(&Uuid::new_v4());
        assert_eq!(gateway_error.status_code(), StatusCode::BAD_REQUEST);

        let body = serde_json::to_value(&gateway_error).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "hours is out of range");
        assert_eq!(body["details"][0]["field"], "hours");
    }
}
