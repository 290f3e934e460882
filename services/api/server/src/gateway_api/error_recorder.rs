use std::sync::Arc;

use telemetry::metrics::Telemetry;
use uuid::Uuid;

use crate::gateway_api::gateway_error::GatewayError;
use crate::metrics::ServerMetrics;

/// Trait for handler error types that can be converted to [`GatewayError`].
pub trait IntoGatewayError {
    fn into_gateway_error(self, request_id: &Uuid) -> GatewayError;
}

/// Records error metrics and converts handler errors to [`GatewayError`].
pub struct ErrorRecorder<'a> {
    telemetry: &'a Arc<Telemetry<ServerMetrics>>,
    handler_name: &'a str,
    request_id: &'a Uuid,
}

impl<'a> ErrorRecorder<'a> {
    pub fn new(
        telemetry: &'a Arc<Telemetry<ServerMetrics>>,
        handler_name: &'a str,
        request_id: &'a Uuid,
    ) -> Self {
        Self {
            telemetry,
            handler_name,
            request_id,
        }
    }

    pub fn record<E: IntoGatewayError>(&self, code: &str, e: E) -> GatewayError {
        self.telemetry.maybe_use_metrics(|m| {
            m.record_error(self.handler_name, code);
        });
        e.into_gateway_error(self.request_id)
    }
}
