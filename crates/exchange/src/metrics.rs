/// Metrics for the exchange.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "exchange")]
pub struct Metrics {
    /// Orders fulfilled, by entry point.
    #[metric(labels("path"))]
    pub fulfilled_orders: prometheus::IntCounterVec,
    /// Calls rejected, by error kind.
    #[metric(labels("kind"))]
    pub rejected_calls: prometheus::IntCounterVec,
    /// Transfers attempted, by item type.
    #[metric(labels("item_type"))]
    pub executions: prometheus::IntCounterVec,
}

impl Metrics {
    /// Get the metrics instance.
    pub fn get() -> &'static Self {
        Self::instance(observe::metrics::get_storage_registry())
            .expect("unexpected error getting metrics instance")
    }

    pub(crate) fn fulfilled(path: &str, orders: usize) {
        Self::get()
            .fulfilled_orders
            .with_label_values(&[path])
            .inc_by(orders as u64);
    }
}

/// Setup the metrics registry.
pub fn init() {
    observe::metrics::setup_registry_reentrant(Some("exchange".to_owned()), None);
}
