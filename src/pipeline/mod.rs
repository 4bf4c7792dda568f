// Message pipeline
//
// classify -> detect -> fetch history -> trim -> generate -> persist
//
// Every stage degrades instead of failing, so `process` always produces a
// reply. Nothing is written until a reply exists; the writes then run on a
// detached task and never hold the reply back. Dropping `process` before
// that point abandons the remote calls and stores nothing.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

mod utterance;

pub use utterance::{Utterance, ValidationError, MAX_MESSAGE_CHARS, MAX_USER_ID_CHARS};

use crate::context::{ContextAssembler, TurnRole};
use crate::crisis::{CrisisDetector, CrisisVerdict};
use crate::emotion::{EmotionClassifier, EmotionResult};
use crate::generator::ResponseGenerator;
use crate::metrics::PipelineMetrics;
use crate::storage::{HistoryStore, PersistenceStore, StoreError};

/// Outcome of one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub reply: String,
    pub emotion: EmotionResult,
    pub is_crisis: bool,
}

pub struct Pipeline {
    classifier: Arc<dyn EmotionClassifier>,
    detector: CrisisDetector,
    assembler: ContextAssembler,
    generator: ResponseGenerator,
    history: Arc<dyn HistoryStore>,
    persistence: Arc<dyn PersistenceStore>,
    metrics: Option<PipelineMetrics>,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        generator: ResponseGenerator,
        history: Arc<dyn HistoryStore>,
        persistence: Arc<dyn PersistenceStore>,
    ) -> Self {
        Self {
            classifier,
            detector: CrisisDetector::default(),
            assembler: ContextAssembler::default(),
            generator,
            history,
            persistence,
            metrics: None,
        }
    }

    pub fn with_detector(mut self, detector: CrisisDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one utterance through the whole pipeline
    ///
    /// Returns as soon as the reply is ready; storage writes finish in the
    /// background.
    pub async fn process(&self, utterance: &Utterance) -> PipelineResult {
        let (result, _writes) = self.run(utterance).await;
        result
    }

    /// Like `process`, but also waits for the storage writes
    ///
    /// For one-shot callers that exit right after the reply.
    pub async fn process_and_wait(&self, utterance: &Utterance) -> PipelineResult {
        let (result, writes) = self.run(utterance).await;
        if let Err(e) = writes.await {
            tracing::error!(error = %e, "Persistence task aborted");
        }
        result
    }

    #[tracing::instrument(skip_all, fields(user_id = %utterance.user_id()))]
    async fn run(&self, utterance: &Utterance) -> (PipelineResult, JoinHandle<()>) {
        let started = Instant::now();
        if let Some(metrics) = &self.metrics {
            metrics.record_request();
        }

        let emotion = self.classifier.classify(utterance.text()).await;
        if emotion == EmotionResult::fallback() {
            if let Some(metrics) = &self.metrics {
                metrics.record_classification_fallback();
            }
        }

        let verdict = self.detector.detect(utterance.text(), &emotion);
        if let (Some(metrics), Some(signal)) = (&self.metrics, &verdict.signal) {
            metrics.record_crisis(signal.as_str());
        }

        tracing::info!(
            emotion = %emotion.label,
            confidence = emotion.confidence,
            crisis = verdict.is_crisis,
            "Message analysed"
        );

        let history = match self
            .history
            .recent_turns(utterance.user_id(), self.assembler.window())
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(error = %e, "History unavailable, replying without context");
                Vec::new()
            }
        };
        let context = self.assembler.assemble(&history);

        let generated = self
            .generator
            .respond(utterance.text(), &context, &verdict)
            .await;
        if let (Some(metrics), Some(failure)) = (&self.metrics, &generated.failure) {
            metrics.record_generation_failure(failure.kind());
        }

        let result = PipelineResult {
            reply: generated.reply,
            emotion,
            is_crisis: verdict.is_crisis,
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe_pipeline_seconds(started.elapsed().as_secs_f64());
        }

        let writes = self.persist(utterance, &result, &verdict);
        (result, writes)
    }

    /// Spawn best-effort writes of the exchange and the mood sample
    ///
    /// The assistant turn is written after the user turn so stored order
    /// matches conversation order; the mood sample runs alongside. No write
    /// waits on another's success.
    fn persist(
        &self,
        utterance: &Utterance,
        result: &PipelineResult,
        verdict: &CrisisVerdict,
    ) -> JoinHandle<()> {
        let persistence = Arc::clone(&self.persistence);
        let metrics = self.metrics.clone();
        let user_id = utterance.user_id().to_string();
        let text = utterance.text().to_string();
        let reply = result.reply.clone();
        let emotion = result.emotion;
        let crisis = verdict.is_crisis;

        tokio::spawn(async move {
            let turns = async {
                let user = persistence
                    .save_turn(&user_id, TurnRole::User, &text, Some(emotion.label))
                    .await;
                let assistant = persistence
                    .save_turn(&user_id, TurnRole::Assistant, &reply, None)
                    .await;
                (user, assistant)
            };
            let mood = persistence.save_mood_sample(&user_id, emotion.label, emotion.confidence);

            let ((user, assistant), mood) = tokio::join!(turns, mood);

            let outcomes: [(&str, Result<(), StoreError>); 3] = [
                ("user_turn", user),
                ("assistant_turn", assistant),
                ("mood_sample", mood),
            ];
            for (record, outcome) in outcomes {
                if let Err(e) = outcome {
                    tracing::warn!(
                        user_id = %user_id,
                        record,
                        crisis,
                        error = %e,
                        "Failed to persist record"
                    );
                    if let Some(metrics) = &metrics {
                        metrics.record_persistence_failure(record);
                    }
                }
            }
        })
    }
}
