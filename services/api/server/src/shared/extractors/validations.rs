use crate::gateway_api::gateway_error::{GatewayError, GatewayErrorDetail};
use crate::shared::extractors::payload::{self, Payload, PayloadRejection};
use crate::shared::extractors::request_id::request_id_from_headers;
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use thiserror::Error;
use uuid::Uuid;

/// ValidatedPayload uses the full request body and therefore should always appear after
/// other extractors that might implement FromRequestParts instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPayload<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedPayload<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let request_id = request_id_from_headers(req.headers());

        let Payload(value) = Payload::<T>::from_request(req, state)
            .await
            .map_err(|PayloadRejection(e, _)| Error::Payload(e, request_id))?;

        match value.validate() {
            Ok(_) => Ok(ValidatedPayload(value)),
            Err(e) => Err(Error::Validation(e, request_id)),
        }
    }
}

/// Query-string counterpart of [`ValidatedPayload`]. Malformed values (for
/// example a non-numeric `hours`) are rejected with a 400 instead of axum's
/// plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let request_id = request_id_from_headers(&parts.headers);

        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Query(e, request_id))?;

        match value.validate() {
            Ok(_) => Ok(ValidatedQuery(value)),
            Err(e) => Err(Error::Validation(e, request_id)),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed")]
    Validation(validator::ValidationErrors, Uuid),

    #[error("Payload error")]
    Payload(payload::Error, Uuid),

    #[error("Query error")]
    Query(QueryRejection, Uuid),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::info!(error = ?self, "Rejected request");
        self.to_gateway_error().into_response()
    }
}

impl Error {
    pub fn to_gateway_error(&self) -> GatewayError {
        match self {
            Error::Validation(validation_errors, request_id) => {
                GatewayError::bad_request(
                    "Validation failed".to_string(),
                    validation_errors_to_details(validation_errors),
                    request_id.to_string(),
                )
            }
            Error::Payload(payload_err, request_id) => {
                payload_err.to_gateway_error(request_id)
            }
            Error::Query(rejection, request_id) => GatewayError::bad_request(
                "Invalid query parameters".to_string(),
                vec![GatewayErrorDetail {
                    field: Some("query".to_string()),
                    code: "invalid_query".to_string(),
                    message: rejection.body_text(),
                    suggestion: "Check the query parameter types".to_string(),
                }],
                request_id.to_string(),
            ),
        }
    }
}

/// Transforms ValidationErrors into detail entries with specific field information.
pub fn validation_errors_to_details(
    errors: &validator::ValidationErrors,
) -> Vec<GatewayErrorDetail> {
    let mut details = Vec::new();
    format_validation_errors_to_details_recursive(errors, None, &mut details);

    // If no specific field errors, return a generic error
    if details.is_empty() {
        details.push(GatewayErrorDetail {
            field: Some("request".to_string()),
            code: "validation_failed".to_string(),
            message: "Validation failed".to_string(),
            suggestion:
                "Check the request parameters and format of the request body"
                    .to_string(),
        });
    }

    details
}

fn format_validation_errors_to_details_recursive(
    errors: &validator::ValidationErrors,
    parent_path: Option<&str>,
    output: &mut Vec<GatewayErrorDetail>,
) {
    for (field, kind) in errors.errors() {
        let current_path = match parent_path {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let (field_name, message) = match current_path.as_str() {
                        // struct-level validation
                        "__all__" => {
                            let message = error.message.clone().unwrap_or(
                                Cow::Owned("validation failed".to_string()),
                            );
                            (error.code.to_string(), message.to_string())
                        }
                        _ => {
                            let error_message =
                                error.message.as_ref().unwrap_or(&error.code);
                            (current_path.clone(), error_message.to_string())
                        }
                    };

                    output.push(GatewayErrorDetail {
                        field: Some(field_name),
                        code: error.code.to_string(),
                        message,
                        suggestion: "Check the field value and format"
                            .to_string(),
                    });
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errors) => {
                format_validation_errors_to_details_recursive(
                    struct_errors,
                    Some(&current_path),
                    output,
                );
            }
            validator::ValidationErrorsKind::List(list_errors) => {
                for (index, item_errors) in list_errors {
                    let item_path = format!("{}[{}]", current_path, index);
                    format_validation_errors_to_details_recursive(
                        item_errors,
                        Some(&item_path),
                        output,
                    );
                }
            }
        }
    }
}
