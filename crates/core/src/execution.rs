//! Execution trace — the immutable audit record of one investigation.
//!
//! A [`Step`] is appended for every observation, thought, and action, with
//! a contiguous 1-based sequence number. [`ExecutionState`] is exclusively
//! owned by its loop controller for the investigation's lifetime; everything
//! outside the loop (API layer, streaming consumers) sees clones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::FraudAssessment;

/// The kind of a trace step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    Observation,
    Thought,
    Action,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Observation => "OBSERVATION",
            Self::Thought => "THOUGHT",
            Self::Action => "ACTION",
        };
        f.write_str(s)
    }
}

/// One appended entry in the execution trace. Never edited after append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// 1-based, contiguous, strictly increasing.
    pub sequence: u32,

    pub kind: StepKind,

    /// Human-readable content of the step.
    pub content: String,

    /// Tool fields, set only on ACTION steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<String>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Lifecycle of an execution. Transitions only Running → Completed or
/// Running → Failed; terminal states are never reversed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

/// The complete state of one investigation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub execution_id: String,
    pub investigation_id: String,

    /// Append-only audit trail.
    pub steps: Vec<Step>,

    /// Current Observe→Think→Act cycle count.
    pub iteration: u32,

    /// Latest reasoning confidence, always within [0, 1].
    pub confidence: f64,

    /// Deduplicated fraud indicators, insertion-ordered.
    pub fraud_indicators: Vec<String>,

    /// Deduplicated evidence entries, insertion-ordered.
    pub evidence: Vec<String>,

    /// Names of tools executed so far, deduplicated.
    pub executed_tools: Vec<String>,

    pub status: ExecutionStatus,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Present once the run has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<FraudAssessment>,
}

impl ExecutionState {
    /// Fresh running state for a new investigation.
    pub fn new(execution_id: impl Into<String>, investigation_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            investigation_id: investigation_id.into(),
            steps: Vec::new(),
            iteration: 0,
            confidence: 0.0,
            fraud_indicators: Vec::new(),
            evidence: Vec::new(),
            executed_tools: Vec::new(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            error: None,
            assessment: None,
        }
    }

    /// Append a step, assigning the next contiguous sequence number.
    pub fn push_step(
        &mut self,
        kind: StepKind,
        content: impl Into<String>,
        tool_name: Option<String>,
        tool_input: Option<serde_json::Value>,
        tool_output: Option<String>,
        duration_ms: Option<u64>,
    ) -> &Step {
        let step = Step {
            sequence: self.steps.len() as u32 + 1,
            kind,
            content: content.into(),
            tool_name,
            tool_input,
            tool_output,
            timestamp: Utc::now(),
            duration_ms,
        };
        self.steps.push(step);
        self.steps.last().expect("just pushed")
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Mark completed with the final assessment. No-op on terminal states.
    pub fn complete(&mut self, assessment: FraudAssessment) {
        if self.status != ExecutionStatus::Running {
            return;
        }
        self.status = ExecutionStatus::Completed;
        self.assessment = Some(assessment);
        self.ended_at = Some(Utc::now());
    }

    /// Mark failed with an error message. Partial state stays readable.
    /// No-op on terminal states.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status != ExecutionStatus::Running {
            return;
        }
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.ended_at = Some(Utc::now());
    }

    /// Total wall-clock duration so far (or final, once ended).
    pub fn duration_ms(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{FraudAssessment, RiskTier};

    fn assessment() -> FraudAssessment {
        FraudAssessment {
            fraud_detected: false,
            confidence: 0.0,
            risk: RiskTier::Low,
            fraud_indicators: vec![],
            evidence: vec![],
            recommended_actions: vec![],
            summary: "nothing found".into(),
        }
    }

    #[test]
    fn sequences_are_contiguous_from_one() {
        let mut state = ExecutionState::new("e1", "i1");
        for _ in 0..5 {
            state.push_step(StepKind::Thought, "t", None, None, None, None);
        }
        let sequences: Vec<u32> = state.steps.iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn complete_is_terminal() {
        let mut state = ExecutionState::new("e1", "i1");
        state.complete(assessment());
        assert_eq!(state.status, ExecutionStatus::Completed);
        assert!(state.ended_at.is_some());

        // A later failure must not reverse the terminal state.
        state.fail("too late");
        assert_eq!(state.status, ExecutionStatus::Completed);
        assert!(state.error.is_none());
    }

    #[test]
    fn fail_preserves_partial_steps() {
        let mut state = ExecutionState::new("e1", "i1");
        state.push_step(StepKind::Observation, "obs", None, None, None, None);
        state.fail("boom");
        assert_eq!(state.status, ExecutionStatus::Failed);
        assert_eq!(state.total_steps(), 1);
        assert_eq!(state.error.as_deref(), Some("boom"));

        // And completion cannot resurrect it.
        state.complete(assessment());
        assert_eq!(state.status, ExecutionStatus::Failed);
        assert!(state.assessment.is_none());
    }

    #[test]
    fn action_step_carries_tool_fields() {
        let mut state = ExecutionState::new("e1", "i1");
        state.push_step(
            StepKind::Action,
            "Executed synthesize_fraud_evidence",
            Some("synthesize_fraud_evidence".into()),
            Some(serde_json::json!({"reasoning": "wrap up"})),
            Some("report text".into()),
            Some(12),
        );
        let step = &state.steps[0];
        assert_eq!(step.kind, StepKind::Action);
        assert_eq!(step.tool_name.as_deref(), Some("synthesize_fraud_evidence"));
        assert_eq!(step.tool_output.as_deref(), Some("report text"));
        assert_eq!(step.duration_ms, Some(12));
    }

    #[test]
    fn step_kind_serializes_screaming() {
        let json = serde_json::to_string(&StepKind::Observation).unwrap();
        assert_eq!(json, r#""OBSERVATION""#);
    }
}
