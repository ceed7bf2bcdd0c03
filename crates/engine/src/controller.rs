//! Loop controller — drives the Observe→Think→Act state machine.
//!
//! States: `INIT → {OBSERVE → THINK → ACT}* → TERMINATED{completed|failed}`.
//! Each cycle is strictly sequential — THINK consumes OBSERVE's snapshot
//! and ACT consumes THINK's recommendation, so there is no intra-cycle
//! parallelism to exploit. The termination predicate runs after every
//! cycle, and however the loop exits, exactly one final synthesis call
//! produces the assessment.
//!
//! Degradation is the design center: reasoning failures fall back to a
//! synthesis recommendation at zero confidence, tool failures become
//! error-text results, and classification failures keep the ingested kind.
//! The only fatal input error is an empty corpus, surfaced before the
//! loop starts.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use fraudhound_config::EngineConfig;
use fraudhound_core::assessment::FraudAssessment;
use fraudhound_core::capability::{Classify, Reason};
use fraudhound_core::document::DocumentBundle;
use fraudhound_core::error::EngineError;
use fraudhound_core::execution::ExecutionState;
use fraudhound_core::tool::{ToolId, ToolRegistry};

use crate::action::Dispatcher;
use crate::memory::ExecutionMemory;
use crate::observation::Observer;
use crate::reasoning::{Reasoning, ReasoningKind, Thinker};
use crate::stream::{result_preview, EventSink, InvestigationStreamEvent};

/// The loop controller for one investigation at a time.
///
/// The controller itself is cheap to clone — all heavy collaborators sit
/// behind `Arc` — so the service clones one per concurrent investigation.
#[derive(Clone)]
pub struct InvestigationLoop {
    reasoner: Arc<dyn Reason>,
    classifier: Arc<dyn Classify>,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
    confidence_threshold: f64,
    stagnation_window: u32,
    stagnation_confidence: f64,
    history_window: usize,
    call_timeout: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl InvestigationLoop {
    /// Create a loop with default engine parameters.
    pub fn new(
        reasoner: Arc<dyn Reason>,
        classifier: Arc<dyn Classify>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self::from_config(reasoner, classifier, tools, &EngineConfig::default())
    }

    /// Create a loop from explicit engine configuration.
    pub fn from_config(
        reasoner: Arc<dyn Reason>,
        classifier: Arc<dyn Classify>,
        tools: Arc<ToolRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            reasoner,
            classifier,
            tools,
            max_iterations: config.max_iterations,
            confidence_threshold: config.confidence_threshold,
            stagnation_window: config.stagnation_window,
            stagnation_confidence: config.stagnation_confidence,
            history_window: config.history_window,
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            cancel: None,
        }
    }

    /// Set the hard iteration budget.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the synthesis confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the stagnation cutoff parameters.
    pub fn with_stagnation(mut self, window: u32, confidence: f64) -> Self {
        self.stagnation_window = window;
        self.stagnation_confidence = confidence;
        self
    }

    /// Set the deadline applied to every external call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Attach a cooperative cancellation flag, checked before each cycle.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Run an investigation to completion (no streaming consumer).
    ///
    /// Returns `Err` only for an invalid corpus; any failure past that
    /// point lands in the returned state's `status` — partial results are
    /// always retrievable.
    pub async fn run(&self, bundle: &DocumentBundle) -> Result<ExecutionState, EngineError> {
        let execution_id = uuid::Uuid::new_v4().to_string();
        self.run_with_sink(&execution_id, bundle, &EventSink::disabled())
            .await
    }

    /// Run an investigation, mirroring progress into `sink`.
    pub async fn run_with_sink(
        &self,
        execution_id: &str,
        bundle: &DocumentBundle,
        sink: &EventSink,
    ) -> Result<ExecutionState, EngineError> {
        if bundle.is_empty() {
            return Err(EngineError::InvalidCorpus(
                "document bundle is empty".into(),
            ));
        }
        Ok(self.run_inner(execution_id, bundle, sink).await)
    }

    async fn run_inner(
        &self,
        execution_id: &str,
        bundle: &DocumentBundle,
        sink: &EventSink,
    ) -> ExecutionState {
        let mut memory = ExecutionMemory::new(execution_id, &bundle.bundle_id);

        info!(
            execution_id,
            bundle = %bundle.bundle_id,
            documents = bundle.len(),
            "Investigation starting"
        );
        sink.emit(InvestigationStreamEvent::AnalysisStarted {
            execution_id: execution_id.to_string(),
            total_documents: bundle.len(),
            timestamp: chrono::Utc::now(),
        });

        let observer = Observer::new(self.classifier.clone());
        let thinker = Thinker::new(self.reasoner.clone(), self.history_window, self.call_timeout);
        let dispatcher = Dispatcher::new(self.tools.clone(), self.call_timeout);

        loop {
            // Cancellation halts before starting a new cycle; in-flight
            // calls already run under the per-call deadline.
            if self.is_cancelled() {
                warn!(execution_id, "Investigation cancelled");
                memory.fail("investigation cancelled");
                sink.emit(InvestigationStreamEvent::AnalysisError {
                    execution_id: execution_id.to_string(),
                    error: "investigation cancelled".into(),
                    timestamp: chrono::Utc::now(),
                });
                return memory.into_state();
            }

            if memory.iteration() >= self.max_iterations {
                break;
            }
            let iteration = memory.begin_iteration();
            debug!(execution_id, iteration, "Investigation cycle");
            sink.emit(InvestigationStreamEvent::IterationStarted {
                iteration,
                timestamp: chrono::Utc::now(),
            });

            // ── OBSERVE ──
            let observation = observer.observe(bundle, &memory).await;
            memory.add_observation(format!(
                "Observation {iteration}: {}",
                observation.content_summary
            ));
            for indicator in &observation.risk_indicators {
                memory.add_indicator(indicator);
            }
            sink.emit(InvestigationStreamEvent::ObservationCompleted {
                iteration,
                observation: observation.content_summary.clone(),
                timestamp: chrono::Utc::now(),
            });

            // ── THINK ──
            let reasoning = thinker
                .think(&observation, memory.steps_tail(self.history_window))
                .await;
            memory.add_thought(&reasoning.rationale);
            memory.set_confidence(reasoning.confidence);
            sink.emit(InvestigationStreamEvent::ReasoningCompleted {
                iteration,
                reasoning: reasoning.rationale.clone(),
                confidence: reasoning.confidence,
                recommended_action: reasoning.recommended_action.clone(),
                timestamp: chrono::Utc::now(),
            });

            // ── ACT ──
            let snapshot = observation.classified_bundle(bundle);
            let options = serde_json::json!({
                "analysis_results": memory.analysis_results(),
            });
            let action = dispatcher.act(&reasoning, &snapshot, &options).await;
            memory.add_action(
                format!("Executed {}", action.tool),
                action.tool.as_str(),
                serde_json::json!({ "reasoning": reasoning.rationale }),
                &action.result,
                action.duration_ms,
            );
            memory.record_tool(action.tool.as_str());
            memory.add_analysis_result(&action.result);
            if action.result.contains("Status: FAIL") {
                memory.add_indicator(&format!("{} flagged findings", action.tool));
                if let Some(line) = action.result.lines().find(|l| l.starts_with("- ")) {
                    memory.add_evidence(line.trim_start_matches("- "));
                }
            }
            sink.emit(InvestigationStreamEvent::ActionCompleted {
                iteration,
                tool_used: action.tool.as_str().to_string(),
                action_result: result_preview(&action.result),
                timestamp: chrono::Utc::now(),
            });

            if self.should_terminate(iteration, memory.confidence(), &reasoning) {
                info!(execution_id, iteration, "Termination condition met");
                sink.emit(InvestigationStreamEvent::TerminationConditionMet {
                    iteration,
                    confidence: reasoning.confidence,
                    reasoning_type: reasoning.kind.as_str().to_string(),
                    timestamp: chrono::Utc::now(),
                });
                break;
            }
        }

        // One unconditional synthesis call, even if the last action was
        // already synthesis.
        let assessment = self.final_synthesis(bundle, &memory).await;
        memory.complete(assessment.clone());
        sink.emit(InvestigationStreamEvent::AnalysisCompleted {
            execution_id: execution_id.to_string(),
            total_iterations: memory.iteration(),
            final_confidence: assessment.confidence,
            fraud_detected: assessment.fraud_detected,
            risk_level: assessment.risk.to_string(),
            timestamp: chrono::Utc::now(),
        });

        info!(
            execution_id,
            iterations = memory.iteration(),
            steps = memory.step_count(),
            risk = %assessment.risk,
            "Investigation completed"
        );
        memory.into_state()
    }

    /// True when any termination condition holds after a cycle.
    fn should_terminate(&self, iteration: u32, confidence: f64, reasoning: &Reasoning) -> bool {
        // High confidence on a synthesis recommendation.
        if reasoning.confidence >= self.confidence_threshold
            && reasoning.kind == ReasoningKind::Synthesis
        {
            return true;
        }

        // Iteration budget exhausted.
        if iteration >= self.max_iterations {
            return true;
        }

        // Stagnation: past the window with persistently low confidence.
        if iteration > self.stagnation_window && confidence < self.stagnation_confidence {
            return true;
        }

        false
    }

    /// The terminal synthesis call. Failure degrades to the fallback
    /// assessment; it never prevents completion.
    async fn final_synthesis(
        &self,
        bundle: &DocumentBundle,
        memory: &ExecutionMemory,
    ) -> FraudAssessment {
        let options = serde_json::json!({
            "analysis_results": memory.analysis_results(),
        });

        let outcome = tokio::time::timeout(
            self.call_timeout,
            self.tools
                .execute(ToolId::SynthesizeFraudEvidence, bundle, &options),
        )
        .await;

        match outcome {
            Ok(Ok(summary)) => FraudAssessment::from_synthesis(
                summary,
                memory.confidence(),
                memory.fraud_indicators().to_vec(),
                memory.evidence().to_vec(),
            ),
            Ok(Err(e)) => {
                warn!(error = %e, "Final synthesis failed, using fallback assessment");
                FraudAssessment::fallback(e)
            }
            Err(_) => {
                warn!("Final synthesis timed out, using fallback assessment");
                FraudAssessment::fallback("synthesis deadline exceeded")
            }
        }
    }
}
