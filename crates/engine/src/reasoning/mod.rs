//! Reasoning stage — one external reasoning call per cycle.
//!
//! `think` is infallible by design: whatever the capability returns (or
//! fails to return) is turned into a usable [`Reasoning`]. A dead or
//! timing-out capability yields the fixed fallback — zero confidence and a
//! synthesis recommendation — which guarantees forward progress toward
//! termination even under total reasoning failure.

pub mod parser;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use fraudhound_core::capability::Reason;
use fraudhound_core::execution::Step;
use fraudhound_core::tool::ToolId;

use crate::observation::Observation;

/// The category a reasoning step falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningKind {
    Investigation,
    Validation,
    Synthesis,
    Fallback,
}

impl ReasoningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Investigation => "investigation",
            Self::Validation => "validation",
            Self::Synthesis => "synthesis",
            Self::Fallback => "fallback",
        }
    }

    /// Parse a wire value; unknown values default to `Investigation`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "validation" => Self::Validation,
            "synthesis" => Self::Synthesis,
            "fallback" => Self::Fallback,
            _ => Self::Investigation,
        }
    }
}

impl std::fmt::Display for ReasoningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed recommendation for the next step. Produced once per cycle.
#[derive(Debug, Clone)]
pub struct Reasoning {
    pub rationale: String,

    /// Raw recommended action name — resolved to a [`ToolId`] at dispatch.
    pub recommended_action: String,

    /// Within [0, 1].
    pub confidence: f64,

    pub kind: ReasoningKind,
}

impl Reasoning {
    /// The fixed degradation value used when the capability call itself
    /// fails or times out.
    pub fn fallback(cause: impl std::fmt::Display) -> Self {
        Self {
            rationale: format!("Unable to generate reasoning: {cause}"),
            recommended_action: ToolId::SynthesizeFraudEvidence.as_str().to_string(),
            confidence: 0.0,
            kind: ReasoningKind::Fallback,
        }
    }
}

/// Drives the reasoning capability and parses its output.
pub struct Thinker {
    reasoner: Arc<dyn Reason>,
    history_window: usize,
    call_timeout: Duration,
}

impl Thinker {
    pub fn new(reasoner: Arc<dyn Reason>, history_window: usize, call_timeout: Duration) -> Self {
        Self {
            reasoner,
            history_window,
            call_timeout,
        }
    }

    /// Generate the next-step recommendation. Never errors.
    pub async fn think(&self, observation: &Observation, history: &[Step]) -> Reasoning {
        let prompt = self.build_prompt(observation, history);

        let response =
            match tokio::time::timeout(self.call_timeout, self.reasoner.reason(&prompt)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(error = %e, "Reasoning capability call failed");
                    return Reasoning::fallback(e);
                }
                Err(_) => {
                    warn!(timeout_secs = self.call_timeout.as_secs(), "Reasoning call timed out");
                    return Reasoning::fallback("reasoning call deadline exceeded");
                }
            };

        let reasoning = parser::parse_reasoning(&response);
        debug!(
            action = %reasoning.recommended_action,
            confidence = reasoning.confidence,
            kind = %reasoning.kind,
            "Reasoning parsed"
        );
        reasoning
    }

    /// Build the cycle prompt from the observation plus a capped history
    /// tail. Prompt *content* quality is an external concern; the engine
    /// only guarantees the structure the parser recognizes is requested.
    fn build_prompt(&self, observation: &Observation, history: &[Step]) -> String {
        let tail = &history[history.len().saturating_sub(self.history_window)..];

        let mut prompt = String::from(
            "You are a fraud detection expert analyzing customs documents.\n\nCURRENT INVESTIGATION STATE:\n",
        );
        prompt.push_str(&format!(
            "- Total documents: {}\n- Summary: {}\n",
            observation.total_documents, observation.content_summary
        ));
        prompt.push_str(&format!(
            "- Risk indicators: {:?}\n- Fraud indicators found: {:?}\n",
            observation.risk_indicators, observation.fraud_indicators
        ));
        prompt.push_str(&format!(
            "- Evidence collected: {} items\n- Tools executed: {:?}\n",
            observation.evidence_count, observation.executed_tools
        ));
        prompt.push_str(&format!(
            "- Confidence level: {}\n- Iteration: {}\n",
            observation.confidence, observation.iteration
        ));

        prompt.push_str("\nINVESTIGATION HISTORY:\n");
        if tail.is_empty() {
            prompt.push_str("Investigation just started.\n");
        } else {
            for step in tail {
                prompt.push_str(&format!("Step {}: {}\n", step.sequence, step.kind));
                if let Some(tool) = &step.tool_name {
                    prompt.push_str(&format!("  Tool: {tool}\n"));
                }
                let preview: String = step.content.chars().take(100).collect();
                prompt.push_str(&format!("  Content: {preview}\n"));
            }
        }

        prompt.push_str(
            "\nBased on this information, what should I investigate next?\n\
             Format your response as:\n\
             REASONING: [your reasoning]\n\
             RECOMMENDED_ACTION: [tool name]\n\
             CONFIDENCE: [0.0 to 1.0]\n\
             REASONING_TYPE: [investigation/validation/synthesis]\n",
        );
        prompt
    }
}
