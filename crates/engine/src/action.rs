//! Action dispatcher — resolves a recommendation to a tool and runs it.
//!
//! Two degradation rules keep dispatch total:
//! - an unknown or unregistered action resolves to the synthesis tool;
//! - execution failures and deadline overruns become an error-carrying
//!   result string, never a loop error.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use fraudhound_core::document::DocumentBundle;
use fraudhound_core::tool::{ToolId, ToolRegistry};

use crate::reasoning::Reasoning;

/// The recorded outcome of one dispatched tool.
#[derive(Debug, Clone)]
pub struct Action {
    /// The tool that actually ran (after fallback resolution).
    pub tool: ToolId,

    /// The raw recommendation this was resolved from.
    pub requested: String,

    /// Tool output, or the captured failure text.
    pub result: String,

    pub succeeded: bool,

    pub timestamp: DateTime<Utc>,

    pub duration_ms: u64,
}

/// Executes recommended actions against the registered tools.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
        }
    }

    /// Resolve the recommendation to a runnable tool id.
    fn resolve(&self, requested: &str) -> ToolId {
        let id = ToolId::resolve(requested);
        if id.as_str() != requested.trim() {
            warn!(requested, "Unknown action, falling back to synthesis");
        }
        if self.registry.contains(id) {
            id
        } else {
            warn!(tool = %id, "Recommended tool not registered, falling back to synthesis");
            ToolId::SynthesizeFraudEvidence
        }
    }

    /// Execute the recommended action. Never errors — failures are
    /// captured in the returned [`Action`].
    pub async fn act(
        &self,
        reasoning: &Reasoning,
        bundle: &DocumentBundle,
        options: &serde_json::Value,
    ) -> Action {
        let tool = self.resolve(&reasoning.recommended_action);
        let started = std::time::Instant::now();

        let outcome = tokio::time::timeout(
            self.call_timeout,
            self.registry.execute(tool, bundle, options),
        )
        .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        let (result, succeeded) = match outcome {
            Ok(Ok(text)) => (text, true),
            Ok(Err(e)) => {
                warn!(tool = %tool, error = %e, "Tool execution failed");
                (format!("Tool execution failed: {e}"), false)
            }
            Err(_) => {
                warn!(tool = %tool, timeout_secs = self.call_timeout.as_secs(), "Tool timed out");
                (
                    format!(
                        "Tool execution failed: {tool} exceeded the {}s deadline",
                        self.call_timeout.as_secs()
                    ),
                    false,
                )
            }
        };

        Action {
            tool,
            requested: reasoning.recommended_action.clone(),
            result,
            succeeded,
            timestamp: Utc::now(),
            duration_ms,
        }
    }
}
