use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Refresh metrics
    pub refresh_requests: IntCounterVec,

    // Provider metrics
    pub provider_fetch_failures: IntCounterVec,
    pub provider_fetch_duration: Histogram,

    // Config/runtime
    pub config_init_failures: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenrefresher".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Refresh
            refresh_requests: IntCounterVec::new(Opts::new("refresh_requests_total", "Refresh requests by outcome"),&["outcome"],).unwrap(),

            // Provider
            provider_fetch_failures: IntCounterVec::new(Opts::new("provider_fetch_failures_total", "Token endpoint failures by reason"),&["reason"],).unwrap(),
            provider_fetch_duration: Histogram::with_opts(HistogramOpts::new("provider_fetch_duration_seconds", "Token endpoint exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),).unwrap(),

            // Config/runtime
            config_init_failures: IntCounter::new("config_init_failures_total","Rejected plugin configurations",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.refresh_requests.clone())).unwrap();
        reg.register(Box::new(metrics.provider_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.provider_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.config_init_failures.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
