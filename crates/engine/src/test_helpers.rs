//! Shared scripted capabilities and tools for engine tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use fraudhound_core::capability::{Classify, Reason};
use fraudhound_core::document::{DocumentBundle, DocumentKind};
use fraudhound_core::error::{CapabilityError, ToolError};
use fraudhound_core::tool::{InvestigationTool, ToolId};

use crate::observation::Observation;

/// A reasoner that replays a scripted response sequence, repeating the
/// last entry once the script runs out.
pub struct ScriptedReasoner {
    responses: Vec<String>,
    calls: Mutex<usize>,
    last_prompt: Mutex<String>,
}

impl ScriptedReasoner {
    pub fn sequence(responses: Vec<&str>) -> Self {
        assert!(!responses.is_empty(), "script needs at least one response");
        Self {
            responses: responses.into_iter().map(String::from).collect(),
            calls: Mutex::new(0),
            last_prompt: Mutex::new(String::new()),
        }
    }

    /// The same response on every call.
    pub fn always(response: &str) -> Self {
        Self::sequence(vec![response])
    }

    /// Like [`always`], when a test wants to inspect the prompt.
    pub fn recording(response: &str) -> Self {
        Self::always(response)
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn last_prompt(&self) -> String {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reason for ScriptedReasoner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn reason(&self, prompt: &str) -> Result<String, CapabilityError> {
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        let mut calls = self.calls.lock().unwrap();
        let index = (*calls).min(self.responses.len() - 1);
        *calls += 1;
        Ok(self.responses[index].clone())
    }
}

/// A reasoner whose every call fails.
pub struct FailingReasoner;

#[async_trait]
impl Reason for FailingReasoner {
    fn name(&self) -> &str {
        "failing"
    }

    async fn reason(&self, _prompt: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::Network("connection refused".into()))
    }
}

/// A reasoner that sleeps past any sensible deadline.
pub struct SlowReasoner(pub Duration);

#[async_trait]
impl Reason for SlowReasoner {
    fn name(&self) -> &str {
        "slow"
    }

    async fn reason(&self, _prompt: &str) -> Result<String, CapabilityError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".into())
    }
}

/// Classifier returning one fixed kind for everything.
pub struct FixedClassifier(pub DocumentKind);

#[async_trait]
impl Classify for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn classify(
        &self,
        _filename: &str,
        _content_sample: &str,
    ) -> Result<DocumentKind, CapabilityError> {
        Ok(self.0)
    }
}

/// Classifier whose every call fails.
pub struct FailingClassifier;

#[async_trait]
impl Classify for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(
        &self,
        _filename: &str,
        _content_sample: &str,
    ) -> Result<DocumentKind, CapabilityError> {
        Err(CapabilityError::Timeout("classification timed out".into()))
    }
}

/// Tool whose every execution fails.
pub struct FailingTool(pub ToolId);

#[async_trait]
impl InvestigationTool for FailingTool {
    fn id(&self) -> ToolId {
        self.0
    }
    fn describe(&self) -> &str {
        "always fails"
    }
    async fn execute(
        &self,
        _bundle: &DocumentBundle,
        _options: &serde_json::Value,
    ) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool: self.0.as_str().into(),
            reason: "simulated failure".into(),
        })
    }
}

/// Tool that sleeps past any sensible deadline.
pub struct SlowTool(pub ToolId, pub Duration);

#[async_trait]
impl InvestigationTool for SlowTool {
    fn id(&self) -> ToolId {
        self.0
    }
    fn describe(&self) -> &str {
        "very slow"
    }
    async fn execute(
        &self,
        _bundle: &DocumentBundle,
        _options: &serde_json::Value,
    ) -> Result<String, ToolError> {
        tokio::time::sleep(self.1).await;
        Ok("too late".into())
    }
}

/// A bare observation for thinker-level tests.
pub fn observation_fixture() -> Observation {
    Observation {
        total_documents: 2,
        document_kinds: vec![
            ("invoice.txt".into(), DocumentKind::CommercialInvoice),
            ("packing.txt".into(), DocumentKind::PackingList),
        ],
        content_summary: "2 document(s) under review".into(),
        risk_indicators: vec![],
        fraud_indicators: vec![],
        evidence_count: 0,
        executed_tools: vec![],
        iteration: 1,
        confidence: 0.0,
    }
}
