//! Execution memory — append-only bookkeeping for one investigation.
//!
//! Wraps the [`ExecutionState`] audit trail with the derived aggregates the
//! loop needs each cycle: deduplicated indicator/evidence sets, the
//! executed-tool set exposed to future observations (so reasoning can avoid
//! redundant retries), and the raw analysis results retained for the final
//! synthesis call. Owned exclusively by one loop controller; everything
//! external receives snapshots.

use fraudhound_core::assessment::FraudAssessment;
use fraudhound_core::execution::{ExecutionState, Step, StepKind};

pub struct ExecutionMemory {
    state: ExecutionState,
    analysis_results: Vec<String>,
}

impl ExecutionMemory {
    pub fn new(execution_id: impl Into<String>, investigation_id: impl Into<String>) -> Self {
        Self {
            state: ExecutionState::new(execution_id, investigation_id),
            analysis_results: Vec::new(),
        }
    }

    // ── Step recording ──

    /// Record an OBSERVATION step.
    pub fn add_observation(&mut self, content: impl Into<String>) {
        self.state
            .push_step(StepKind::Observation, content, None, None, None, None);
    }

    /// Record a THOUGHT step.
    pub fn add_thought(&mut self, content: impl Into<String>) {
        self.state
            .push_step(StepKind::Thought, content, None, None, None, None);
    }

    /// Record an ACTION step with its tool usage.
    pub fn add_action(
        &mut self,
        content: impl Into<String>,
        tool_name: impl Into<String>,
        tool_input: serde_json::Value,
        tool_output: impl Into<String>,
        duration_ms: u64,
    ) {
        self.state.push_step(
            StepKind::Action,
            content,
            Some(tool_name.into()),
            Some(tool_input),
            Some(tool_output.into()),
            Some(duration_ms),
        );
    }

    // ── Derived views ──

    pub fn step_count(&self) -> usize {
        self.state.steps.len()
    }

    /// All steps of one kind, in trace order.
    pub fn steps_of_kind(&self, kind: StepKind) -> Vec<&Step> {
        self.state.steps.iter().filter(|s| s.kind == kind).collect()
    }

    /// The trailing `n` steps — the history window handed to the reasoner.
    pub fn steps_tail(&self, n: usize) -> &[Step] {
        let len = self.state.steps.len();
        &self.state.steps[len.saturating_sub(n)..]
    }

    // ── Aggregate state ──

    /// Start the next cycle; returns the new iteration number.
    pub fn begin_iteration(&mut self) -> u32 {
        self.state.iteration += 1;
        self.state.iteration
    }

    pub fn iteration(&self) -> u32 {
        self.state.iteration
    }

    /// Update confidence, clamped into [0, 1].
    pub fn set_confidence(&mut self, confidence: f64) {
        self.state.confidence = confidence.clamp(0.0, 1.0);
    }

    pub fn confidence(&self) -> f64 {
        self.state.confidence
    }

    /// Idempotent insertion. Returns `true` if the indicator was new.
    pub fn add_indicator(&mut self, indicator: &str) -> bool {
        push_unique(&mut self.state.fraud_indicators, indicator)
    }

    /// Idempotent insertion. Returns `true` if the evidence entry was new.
    pub fn add_evidence(&mut self, evidence: &str) -> bool {
        push_unique(&mut self.state.evidence, evidence)
    }

    /// Record that a tool ran. Returns `true` on first execution.
    pub fn record_tool(&mut self, tool_name: &str) -> bool {
        push_unique(&mut self.state.executed_tools, tool_name)
    }

    pub fn fraud_indicators(&self) -> &[String] {
        &self.state.fraud_indicators
    }

    pub fn evidence(&self) -> &[String] {
        &self.state.evidence
    }

    pub fn executed_tools(&self) -> &[String] {
        &self.state.executed_tools
    }

    /// Retain a raw tool output for the final synthesis call.
    pub fn add_analysis_result(&mut self, result: impl Into<String>) {
        self.analysis_results.push(result.into());
    }

    pub fn analysis_results(&self) -> &[String] {
        &self.analysis_results
    }

    // ── Lifecycle ──

    pub fn complete(&mut self, assessment: FraudAssessment) {
        self.state.complete(assessment);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.state.fail(error);
    }

    /// Immutable view for observation building.
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Detached snapshot for external readers.
    pub fn snapshot(&self) -> ExecutionState {
        self.state.clone()
    }

    /// Consume the memory, yielding the final state.
    pub fn into_state(self) -> ExecutionState {
        self.state
    }
}

/// Set-semantics push preserving first-insertion order.
fn push_unique(items: &mut Vec<String>, candidate: &str) -> bool {
    if items.iter().any(|i| i == candidate) {
        return false;
    }
    items.push(candidate.to_string());
    true
}
