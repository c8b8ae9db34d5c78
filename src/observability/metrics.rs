use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub pricing_quotes_total: IntCounterVec,
    pub distance_resolutions_total: IntCounterVec,
    pub driver_stats_requests_total: IntCounterVec,
    pub driver_stats_latency_seconds: HistogramVec,
    pub data_source_failures_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pricing_quotes_total = IntCounterVec::new(
            Opts::new("pricing_quotes_total", "Delivery quotes produced by distance band"),
            &["band"],
        )
        .expect("valid pricing_quotes_total metric");

        let distance_resolutions_total = IntCounterVec::new(
            Opts::new(
                "distance_resolutions_total",
                "Distance lookups by the strategy that answered",
            ),
            &["strategy"],
        )
        .expect("valid distance_resolutions_total metric");

        let driver_stats_requests_total = IntCounterVec::new(
            Opts::new("driver_stats_requests_total", "Driver stats requests by outcome"),
            &["outcome"],
        )
        .expect("valid driver_stats_requests_total metric");

        let driver_stats_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "driver_stats_latency_seconds",
                "Latency of driver stats aggregation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid driver_stats_latency_seconds metric");

        let data_source_failures_total = IntCounterVec::new(
            Opts::new("data_source_failures_total", "Failed reads per data source"),
            &["source"],
        )
        .expect("valid data_source_failures_total metric");

        registry
            .register(Box::new(pricing_quotes_total.clone()))
            .expect("register pricing_quotes_total");
        registry
            .register(Box::new(distance_resolutions_total.clone()))
            .expect("register distance_resolutions_total");
        registry
            .register(Box::new(driver_stats_requests_total.clone()))
            .expect("register driver_stats_requests_total");
        registry
            .register(Box::new(driver_stats_latency_seconds.clone()))
            .expect("register driver_stats_latency_seconds");
        registry
            .register(Box::new(data_source_failures_total.clone()))
            .expect("register data_source_failures_total");

        Self {
            registry,
            pricing_quotes_total,
            distance_resolutions_total,
            driver_stats_requests_total,
            driver_stats_latency_seconds,
            data_source_failures_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
