use prometheus::{Encoder, Registry, TextEncoder};

/// A set of service metrics living in their own registry.
pub trait TelemetryMetrics: Clone + Send + Sync + 'static {
    fn registry(&self) -> &Registry;

    fn metrics(&self) -> Option<Self>;

    /// Text exposition of everything registered in [`Self::registry`].
    fn gather_metrics(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) =
            TextEncoder::new().encode(&self.registry().gather(), &mut buffer)
        {
            tracing::error!("could not encode service metrics: {}", e);
            return String::default();
        }

        String::from_utf8(buffer).unwrap_or_else(|e| {
            tracing::error!("service metrics could not be from_utf8'd: {}", e);
            String::default()
        })
    }
}
