//! Streaming events — every memory mutation and loop transition, mirrored
//! in generation order onto a consumer channel.
//!
//! Emission never blocks the loop: the sink writes with `try_send` into a
//! bounded queue, and a full or closed queue costs a dropped event and a
//! `warn!`, nothing more. Events are emitted only after their generating
//! step is in the trace, so the streamed sequence is always order-consistent
//! with the audit log. Consumers must treat unrecognized `type` values as
//! forward-compatible no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Bounded queue size between the loop and a streaming consumer.
pub const CHANNEL_CAPACITY: usize = 256;

/// How much of a tool result is carried in an event.
const RESULT_PREVIEW_CHARS: usize = 200;

/// Events emitted while an investigation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvestigationStreamEvent {
    /// The investigation has been accepted and the loop is starting.
    AnalysisStarted {
        execution_id: String,
        total_documents: usize,
        timestamp: DateTime<Utc>,
    },

    /// A new Observe→Think→Act cycle has begun.
    IterationStarted {
        iteration: u32,
        timestamp: DateTime<Utc>,
    },

    /// The observation step of this cycle is in the trace.
    ObservationCompleted {
        iteration: u32,
        observation: String,
        timestamp: DateTime<Utc>,
    },

    /// The thought step of this cycle is in the trace.
    ReasoningCompleted {
        iteration: u32,
        reasoning: String,
        confidence: f64,
        recommended_action: String,
        timestamp: DateTime<Utc>,
    },

    /// The action step of this cycle is in the trace.
    ActionCompleted {
        iteration: u32,
        tool_used: String,
        action_result: String,
        timestamp: DateTime<Utc>,
    },

    /// A termination condition held after this cycle.
    TerminationConditionMet {
        iteration: u32,
        confidence: f64,
        reasoning_type: String,
        timestamp: DateTime<Utc>,
    },

    /// The final assessment exists; the investigation is over.
    AnalysisCompleted {
        execution_id: String,
        total_iterations: u32,
        final_confidence: f64,
        fraud_detected: bool,
        risk_level: String,
        timestamp: DateTime<Utc>,
    },

    /// The investigation failed; partial state is still retrievable.
    AnalysisError {
        execution_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl InvestigationStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AnalysisStarted { .. } => "analysis_started",
            Self::IterationStarted { .. } => "iteration_started",
            Self::ObservationCompleted { .. } => "observation_completed",
            Self::ReasoningCompleted { .. } => "reasoning_completed",
            Self::ActionCompleted { .. } => "action_completed",
            Self::TerminationConditionMet { .. } => "termination_condition_met",
            Self::AnalysisCompleted { .. } => "analysis_completed",
            Self::AnalysisError { .. } => "analysis_error",
        }
    }
}

/// Truncate a tool result for event payloads.
pub fn result_preview(result: &str) -> String {
    if result.chars().count() <= RESULT_PREVIEW_CHARS {
        return result.to_string();
    }
    let truncated: String = result.chars().take(RESULT_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}

/// Non-blocking event sink. A disabled sink (blocking API) drops
/// everything silently; an attached sink forwards with `try_send`.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<InvestigationStreamEvent>>,
}

impl EventSink {
    /// Sink for non-streaming runs.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Sink feeding a consumer channel.
    pub fn attached(tx: mpsc::Sender<InvestigationStreamEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a bounded channel and a sink feeding it.
    pub fn channel() -> (Self, mpsc::Receiver<InvestigationStreamEvent>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self::attached(tx), rx)
    }

    /// Emit an event. Delivery failure is logged and swallowed — a slow or
    /// vanished consumer never stalls or kills the investigation.
    pub fn emit(&self, event: InvestigationStreamEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(ev) => {
                    warn!(event_type = ev.event_type(), "Stream queue full, dropping event");
                }
                mpsc::error::TrySendError::Closed(ev) => {
                    warn!(event_type = ev.event_type(), "Stream consumer gone, dropping event");
                }
            }
        }
    }
}
