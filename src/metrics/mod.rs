// Pipeline metrics
// Prometheus counters for requests, crisis verdicts and degraded paths

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics owned by one service instance
///
/// Holds its own registry so tests and multiple instances never collide.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Registry,
    chat_requests: IntCounter,
    crisis_verdicts: IntCounterVec,
    generation_failures: IntCounterVec,
    classification_fallbacks: IntCounter,
    persistence_failures: IntCounterVec,
    pipeline_seconds: Histogram,
}

impl PipelineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("mindmitra".to_string()), None)?;

        let chat_requests = IntCounter::new("chat_requests_total", "Chat messages processed")?;
        let crisis_verdicts = IntCounterVec::new(
            Opts::new("crisis_verdicts_total", "Messages flagged as crisis, by signal"),
            &["signal"],
        )?;
        let generation_failures = IntCounterVec::new(
            Opts::new("generation_failures_total", "Fallback replies served, by failure kind"),
            &["kind"],
        )?;
        let classification_fallbacks = IntCounter::new(
            "classification_fallbacks_total",
            "Messages classified with the zero-confidence fallback",
        )?;
        let persistence_failures = IntCounterVec::new(
            Opts::new("persistence_failures_total", "Failed best-effort writes, by record"),
            &["record"],
        )?;
        let pipeline_seconds = Histogram::with_opts(HistogramOpts::new(
            "pipeline_seconds",
            "Time from message receipt to reply",
        ))?;

        registry.register(Box::new(chat_requests.clone()))?;
        registry.register(Box::new(crisis_verdicts.clone()))?;
        registry.register(Box::new(generation_failures.clone()))?;
        registry.register(Box::new(classification_fallbacks.clone()))?;
        registry.register(Box::new(persistence_failures.clone()))?;
        registry.register(Box::new(pipeline_seconds.clone()))?;

        Ok(Self {
            registry,
            chat_requests,
            crisis_verdicts,
            generation_failures,
            classification_fallbacks,
            persistence_failures,
            pipeline_seconds,
        })
    }

    pub fn record_request(&self) {
        self.chat_requests.inc();
    }

    pub fn record_crisis(&self, signal: &str) {
        self.crisis_verdicts.with_label_values(&[signal]).inc();
    }

    pub fn record_generation_failure(&self, kind: &str) {
        self.generation_failures.with_label_values(&[kind]).inc();
    }

    pub fn record_classification_fallback(&self) {
        self.classification_fallbacks.inc();
    }

    pub fn record_persistence_failure(&self, record: &str) {
        self.persistence_failures.with_label_values(&[record]).inc();
    }

    pub fn observe_pipeline_seconds(&self, seconds: f64) {
        self.pipeline_seconds.observe(seconds);
    }

    pub fn chat_requests(&self) -> u64 {
        self.chat_requests.get()
    }

    pub fn crisis_count(&self, signal: &str) -> u64 {
        self.crisis_verdicts.with_label_values(&[signal]).get()
    }

    pub fn generation_failure_count(&self, kind: &str) -> u64 {
        self.generation_failures.with_label_values(&[kind]).get()
    }

    pub fn persistence_failure_count(&self, record: &str) -> u64 {
        self.persistence_failures.with_label_values(&[record]).get()
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
