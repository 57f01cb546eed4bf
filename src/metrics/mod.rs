use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for flow runs
// ============================================================================
//
// Tracks:
// - Customer API calls by operation and HTTP status
// - Flow outcomes per workflow (create, update)
// - Polling attempts needed to reach a terminal status
// - Baseline seeding attempts
//
// The runner prints the text exposition on request; nothing is served.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub api_requests: IntCounterVec,
    pub flow_outcomes: IntCounterVec,
    pub poll_attempts: HistogramVec,
    pub baseline_attempts: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let api_requests = IntCounterVec::new(
            Opts::new("customer_api_requests_total", "Customer API calls by operation and status"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(api_requests.clone()))?;

        let flow_outcomes = IntCounterVec::new(
            Opts::new("flow_outcomes_total", "Finished flows by workflow and outcome"),
            &["workflow", "outcome"],
        )?;
        registry.register(Box::new(flow_outcomes.clone()))?;

        // Buckets cover the create budget of 15 lookups
        let poll_attempts = HistogramVec::new(
            HistogramOpts::new("poll_attempts", "Status lookups per polling run")
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 10.0, 15.0]),
            &["workflow"],
        )?;
        registry.register(Box::new(poll_attempts.clone()))?;

        let baseline_attempts = IntCounterVec::new(
            Opts::new("baseline_attempts_total", "Baseline seeding attempts by result"),
            &["result"],
        )?;
        registry.register(Box::new(baseline_attempts.clone()))?;

        Ok(Self {
            registry,
            api_requests,
            flow_outcomes,
            poll_attempts,
            baseline_attempts,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `status` is the HTTP status, or a label such as `transport_error`
    pub fn record_api_request(&self, operation: &str, status: &str) {
        self.api_requests.with_label_values(&[operation, status]).inc();
    }

    pub fn record_flow_outcome(&self, workflow: &str, outcome: &str) {
        self.flow_outcomes.with_label_values(&[workflow, outcome]).inc();
    }

    pub fn record_poll(&self, workflow: &str, attempts: u32) {
        self.poll_attempts
            .with_label_values(&[workflow])
            .observe(attempts as f64);
    }

    pub fn record_baseline_attempt(&self, result: &str) {
        self.baseline_attempts.with_label_values(&[result]).inc();
    }

    /// Prometheus text exposition of everything recorded so far
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_api_request("create_customer", "200");
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_api_request() {
        let metrics = Metrics::new().unwrap();
        metrics.record_api_request("get_request", "200");
        metrics.record_api_request("get_request", "200");
        metrics.record_api_request("get_request", "502");

        assert_eq!(metrics.api_requests.with_label_values(&["get_request", "200"]).get(), 2);
        assert_eq!(metrics.api_requests.with_label_values(&["get_request", "502"]).get(), 1);
    }

    #[test]
    fn test_record_poll_and_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record_poll("create", 3);
        metrics.record_flow_outcome("create", "active_verified");

        let histogram = metrics.poll_attempts.with_label_values(&["create"]);
        assert_eq!(histogram.get_sample_count(), 1);
        assert_eq!(histogram.get_sample_sum(), 3.0);
        assert_eq!(
            metrics.flow_outcomes.with_label_values(&["create", "active_verified"]).get(),
            1
        );
    }

    #[test]
    fn test_encode_text_contains_recorded_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_baseline_attempt("success");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("baseline_attempts_total"));
        assert!(text.contains("result=\"success\""));
    }
}
