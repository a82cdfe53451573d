//! Prometheus metrics for the monitor and its HTTP surface

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub evaluation_cycles_total: IntCounter,
    pub symbols_evaluated_total: IntCounter,
    pub symbols_skipped_total: IntCounter,
    pub evaluation_duration_seconds: Histogram,
    pub alerts_sent_total: IntCounter,
    pub alerts_failed_total: IntCounter,
    pub alerts_suppressed_total: IntCounter,
    pub commands_received_total: IntCounter,
    pub commands_unauthorized_total: IntCounter,
    pub transport_poll_failures_total: IntCounter,
    pub monitoring_active: Gauge,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: Gauge,
    pub http_request_duration_seconds: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    let gauge = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn histogram(registry: &Registry, name: &str, help: &str) -> Result<Histogram, prometheus::Error> {
    let histogram = Histogram::with_opts(HistogramOpts::new(name, help))?;
    registry.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        Ok(Self {
            evaluation_cycles_total: counter(
                &registry,
                "evaluation_cycles_total",
                "Watchlist refresh cycles run",
            )?,
            symbols_evaluated_total: counter(
                &registry,
                "symbols_evaluated_total",
                "Symbols that produced a signal record",
            )?,
            symbols_skipped_total: counter(
                &registry,
                "symbols_skipped_total",
                "Symbols skipped for missing or failed market data",
            )?,
            evaluation_duration_seconds: histogram(
                &registry,
                "evaluation_duration_seconds",
                "Duration of one watchlist refresh",
            )?,
            alerts_sent_total: counter(&registry, "alerts_sent_total", "Outbound alerts delivered")?,
            alerts_failed_total: counter(
                &registry,
                "alerts_failed_total",
                "Outbound alerts that failed after retries",
            )?,
            alerts_suppressed_total: counter(
                &registry,
                "alerts_suppressed_total",
                "Alerts withheld by the cooldown policy",
            )?,
            commands_received_total: counter(
                &registry,
                "commands_received_total",
                "Authorized remote commands dispatched",
            )?,
            commands_unauthorized_total: counter(
                &registry,
                "commands_unauthorized_total",
                "Inbound messages dropped for an unknown sender",
            )?,
            transport_poll_failures_total: counter(
                &registry,
                "transport_poll_failures_total",
                "Command polls that failed at the transport",
            )?,
            monitoring_active: gauge(
                &registry,
                "monitoring_active",
                "1 while watchlist monitoring is active",
            )?,
            http_requests_total: counter(&registry, "http_requests_total", "HTTP requests served")?,
            http_requests_in_flight: gauge(
                &registry,
                "http_requests_in_flight",
                "HTTP requests currently being served",
            )?,
            http_request_duration_seconds: histogram(
                &registry,
                "http_request_duration_seconds",
                "HTTP request latency",
            )?,
            registry,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
