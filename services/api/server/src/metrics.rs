use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use telemetry::metrics::TelemetryMetrics;

#[derive(Clone, Debug)]
pub struct ServerMetrics {
    pub registry: Registry,

    pub request_errors: IntCounterVec,
    pub readings_ingested: IntCounter,
    pub relay_commands: IntCounterVec,
}

impl TelemetryMetrics for ServerMetrics {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn metrics(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ServerMetrics {
    pub fn new(prefix: Option<String>) -> anyhow::Result<Self> {
        let request_errors = IntCounterVec::new(
            Opts::new(
                "request_errors",
                "A metric counting request errors by handler and error code",
            ),
            &["handler", "error_code"],
        )?;

        let readings_ingested = IntCounter::new(
            "readings_ingested",
            "Number of meter readings stored",
        )?;

        let relay_commands = IntCounterVec::new(
            Opts::new(
                "relay_commands",
                "Relay commands accepted by relay number and requested state",
            ),
            &["relay", "state"],
        )?;

        let registry = Registry::new_custom(prefix, None)?;
        registry.register(Box::new(request_errors.clone()))?;
        registry.register(Box::new(readings_ingested.clone()))?;
        registry.register(Box::new(relay_commands.clone()))?;

        Ok(Self {
            registry,
            request_errors,
            readings_ingested,
            relay_commands,
        })
    }

    pub fn record_error(&self, handler: &str, error_code: &str) {
        self.request_errors
            .with_label_values(&[handler, error_code])
            .inc();
    }

    pub fn record_reading_ingested(&self) {
        self.readings_ingested.inc();
    }

    pub fn record_relay_command(&self, relay: i64, state: bool) {
        let relay = relay.to_string();
        let state = if state { "on" } else { "off" };
        self.relay_commands
            .with_label_values(&[relay.as_str(), state])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_exposed_under_the_prefix() {
        let metrics = ServerMetrics::new(Some("gateway".to_string())).unwrap();
        metrics.record_error("ingest_reading", "operation_failure");
        metrics.record_reading_ingested();
        metrics.record_relay_command(2, true);

        let rendered = metrics.gather_metrics();
        assert!(rendered.contains(
            "gateway_request_errors{error_code=\"operation_failure\",handler=\"ingest_reading\"} 1"
        ));
        assert!(rendered.contains("gateway_readings_ingested 1"));
        assert!(
            rendered.contains("gateway_relay_commands{relay=\"2\",state=\"on\"} 1")
        );
    }
}
