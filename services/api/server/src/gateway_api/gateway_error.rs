use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;

pub const STATUS_ERROR: &str = "error";
pub const STATUS_NO_DATA: &str = "no data";

/// Error body returned by every gateway endpoint.
///
/// `status` and `message` are what the metering device and the dashboard
/// read; the remaining fields are for operators.
#[derive(Serialize)]
pub struct GatewayError {
    #[serde(skip)]
    pub(crate) status_code: StatusCode,
    pub(crate) status: &'static str,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) details: Vec<GatewayErrorDetail>,
    pub(crate) timestamp: String,
    pub(crate) request_id: String,
}

impl GatewayError {
    fn new(
        status_code: StatusCode,
        status: &'static str,
        message: String,
        details: Vec<GatewayErrorDetail>,
        request_id: String,
    ) -> Self {
        Self {
            status_code,
            status,
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
            request_id,
        }
    }

    pub fn bad_request(
        message: String,
        details: Vec<GatewayErrorDetail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            STATUS_ERROR,
            message,
            details,
            request_id,
        )
    }

    pub fn not_found(
        message: String,
        details: Vec<GatewayErrorDetail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            STATUS_ERROR,
            message,
            details,
            request_id,
        )
    }

    /// 404 for an empty dataset, which clients treat as a normal state.
    pub fn no_data(message: String, request_id: String) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            STATUS_NO_DATA,
            message,
            Vec::new(),
            request_id,
        )
    }

    pub fn internal_server_error(
        message: String,
        details: Vec<GatewayErrorDetail>,
        request_id: String,
    ) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            STATUS_ERROR,
            message,
            details,
            request_id,
        )
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

#[derive(Serialize, Debug, Default)]
pub struct GatewayErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) suggestion: String,
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        if self.status_code.is_server_error() {
            sentry::Hub::with_active(|hub| hub.capture_error(&self));
        }

        (self.status_code, axum::Json(self)).into_response()
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {}, {}",
            self.status_code,
            self.message,
            self.request_id,
            self.details
                .iter()
                .map(|d| d.message.clone())
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

impl std::fmt::Debug for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayError")
            .field("status_code", &self.status_code)
            .field("status", &self.status)
            .field("message", &self.message)
            .field("details", &self.details)
            .field("timestamp", &self.timestamp)
            .field("request_id", &self.request_id)
            .finish()
    }
}

impl std::error::Error for GatewayError {}
