use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway_api::gateway_error::{GatewayError, GatewayErrorDetail};
use crate::shared::extractors::request_id::request_id_from_headers;

/// JSON body extractor that reports the failing field path on rejection.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let request_id = request_id_from_headers(req.headers());

        if !json_content_type(req.headers()) {
            return Err(PayloadRejection(
                Error::MissingJsonContentType,
                request_id,
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| PayloadRejection(e.into(), request_id))?;
        let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
        let value: T = serde_path_to_error::deserialize(deserializer)
            .map_err(|e| PayloadRejection(e.into(), request_id))?;

        Ok(Payload(value))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bytes(#[from] BytesRejection),

    #[error(transparent)]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("missing content-type header")]
    MissingJsonContentType,
}

impl Error {
    pub fn to_gateway_error(&self, request_id: &Uuid) -> GatewayError {
        let detail = match self {
            Error::Json(serde_err) => {
                let path = serde_err.path().to_string();
                let field_path = match path.as_str() {
                    "" | "." => None,
                    _ => Some(path),
                };
                let inner_message = serde_err.inner().to_string();

                match (extract_missing_field(&inner_message), field_path) {
                    (Some(missing), parent) => GatewayErrorDetail {
                        field: Some(match parent {
                            Some(parent) => format!("{parent}.{missing}"),
                            None => missing.clone(),
                        }),
                        code: "missing_field".to_string(),
                        message: format!("Missing required field: {missing}"),
                        suggestion: "Add the field to the request body"
                            .to_string(),
                    },
                    (None, Some(field_path)) => GatewayErrorDetail {
                        message: format!(
                            "Invalid value for field '{field_path}': {inner_message}"
                        ),
                        field: Some(field_path),
                        code: "invalid_field".to_string(),
                        suggestion: "Check the field value and format"
                            .to_string(),
                    },
                    (None, None) => GatewayErrorDetail {
                        field: Some("request".to_string()),
                        code: "invalid_json".to_string(),
                        message: format!("Invalid JSON: {inner_message}"),
                        suggestion: "Send a JSON object as the request body"
                            .to_string(),
                    },
                }
            }
            Error::MissingJsonContentType => GatewayErrorDetail {
                field: Some("Content-Type".to_string()),
                code: "missing_content_type".to_string(),
                message: "Content-Type header must be application/json"
                    .to_string(),
                suggestion: "Set Content-Type header to application/json"
                    .to_string(),
            },
            Error::Bytes(_) => GatewayErrorDetail {
                field: Some("request".to_string()),
                code: "request_body_error".to_string(),
                message: "Unable to read request body".to_string(),
                suggestion: "Check the request body and content length"
                    .to_string(),
            },
        };

        GatewayError::bad_request(
            "Invalid request payload".to_string(),
            vec![detail],
            request_id.to_string(),
        )
    }
}

/// Rejection carrying the request id that was current when the body failed.
#[derive(Debug)]
pub struct PayloadRejection(pub Error, pub Uuid);

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        let PayloadRejection(error, request_id) = self;
        tracing::info!(%request_id, error = %error, "Rejected request payload");
        error.to_gateway_error(&request_id).into_response()
    }
}

/// Extracts the field name from a serde "missing field" message.
/// Example: "missing field `relay`" -> Some("relay")
fn extract_missing_field(message: &str) -> Option<String> {
    let start = message.find("missing field")?;
    let after_missing = &message[start + "missing field".len()..];

    let open = after_missing.find('`')?;
    let close = after_missing[open + 1..].find('`')?;
    Some(after_missing[open + 1..open + 1 + close].to_string())
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return false;
    };

    let Ok(content_type) = content_type.to_str() else {
        return false;
    };

    let Ok(mime) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json"
            || mime.suffix().is_some_and(|name| name == "json"))
}
