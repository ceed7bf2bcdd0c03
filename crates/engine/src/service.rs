//! Investigation service — the upward API over the loop controller.
//!
//! Runs many investigations concurrently as independent loop instances.
//! The only shared state is the `Arc`'d capability clients and tool
//! registry (all safe for concurrent use) plus a snapshot table external
//! readers query — live `ExecutionState` is never handed out, only clones.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{info, warn};

use fraudhound_config::EngineConfig;
use fraudhound_core::capability::{Classify, Reason};
use fraudhound_core::document::DocumentBundle;
use fraudhound_core::error::EngineError;
use fraudhound_core::execution::ExecutionState;
use fraudhound_core::tool::ToolRegistry;

use crate::controller::InvestigationLoop;
use crate::stream::{EventSink, InvestigationStreamEvent};

/// Per-request overrides of the engine defaults.
#[derive(Debug, Clone, Default)]
pub struct InvestigationOptions {
    pub max_iterations: Option<u32>,
    pub confidence_threshold: Option<f64>,
}

/// Long-lived service owning the shared collaborators.
pub struct InvestigationService {
    reasoner: Arc<dyn Reason>,
    classifier: Arc<dyn Classify>,
    tools: Arc<ToolRegistry>,
    config: EngineConfig,
    // Arc'd so background investigation tasks can publish their final
    // snapshots after the calling handler has returned.
    executions: Arc<RwLock<HashMap<String, ExecutionState>>>,
    cancellations: Arc<RwLock<HashMap<String, watch::Sender<bool>>>>,
}

impl InvestigationService {
    pub fn new(
        reasoner: Arc<dyn Reason>,
        classifier: Arc<dyn Classify>,
        tools: Arc<ToolRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            reasoner,
            classifier,
            tools,
            config,
            executions: Arc::new(RwLock::new(HashMap::new())),
            cancellations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn build_loop(
        &self,
        options: &InvestigationOptions,
        cancel: watch::Receiver<bool>,
    ) -> InvestigationLoop {
        let mut runner = InvestigationLoop::from_config(
            self.reasoner.clone(),
            self.classifier.clone(),
            self.tools.clone(),
            &self.config,
        )
        .with_cancellation(cancel);
        if let Some(max) = options.max_iterations {
            runner = runner.with_max_iterations(max);
        }
        if let Some(threshold) = options.confidence_threshold {
            runner = runner.with_confidence_threshold(threshold);
        }
        runner
    }

    /// Register a new execution: placeholder snapshot + cancellation flag.
    async fn register(&self, bundle: &DocumentBundle) -> (String, watch::Receiver<bool>) {
        let execution_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = watch::channel(false);
        self.executions.write().await.insert(
            execution_id.clone(),
            ExecutionState::new(&execution_id, &bundle.bundle_id),
        );
        self.cancellations
            .write()
            .await
            .insert(execution_id.clone(), tx);
        (execution_id, rx)
    }

    async fn finish(&self, execution_id: &str, state: ExecutionState) {
        self.executions
            .write()
            .await
            .insert(execution_id.to_string(), state);
        self.cancellations.write().await.remove(execution_id);
    }

    /// Run an investigation to completion and return its final state.
    pub async fn start_investigation(
        &self,
        bundle: DocumentBundle,
        options: InvestigationOptions,
    ) -> Result<ExecutionState, EngineError> {
        if bundle.is_empty() {
            return Err(EngineError::InvalidCorpus(
                "document bundle is empty".into(),
            ));
        }

        let (execution_id, cancel) = self.register(&bundle).await;
        let runner = self.build_loop(&options, cancel);
        let state = runner
            .run_with_sink(&execution_id, &bundle, &EventSink::disabled())
            .await?;
        self.finish(&execution_id, state.clone()).await;
        Ok(state)
    }

    /// Start an investigation in the background; returns the execution id
    /// and the ordered event stream immediately.
    pub async fn start_investigation_streaming(
        &self,
        bundle: DocumentBundle,
        options: InvestigationOptions,
    ) -> Result<(String, mpsc::Receiver<InvestigationStreamEvent>), EngineError> {
        if bundle.is_empty() {
            return Err(EngineError::InvalidCorpus(
                "document bundle is empty".into(),
            ));
        }

        let (execution_id, cancel) = self.register(&bundle).await;
        let runner = self.build_loop(&options, cancel);
        let (sink, rx) = EventSink::channel();

        let executions = self.executions.clone();
        let cancellations = self.cancellations.clone();
        let id = execution_id.clone();
        tokio::spawn(async move {
            let state = match runner.run_with_sink(&id, &bundle, &sink).await {
                Ok(state) => state,
                Err(e) => {
                    // Corpus was validated above; this covers any future
                    // pre-loop failure mode.
                    warn!(execution_id = %id, error = %e, "Investigation failed to start");
                    let mut state = ExecutionState::new(&id, &bundle.bundle_id);
                    state.fail(e.to_string());
                    state
                }
            };
            executions.write().await.insert(id.clone(), state);
            cancellations.write().await.remove(&id);
        });

        info!(execution_id = %execution_id, "Streaming investigation started");
        Ok((execution_id, rx))
    }

    /// Snapshot of an execution, live or finished.
    pub async fn get_execution(&self, execution_id: &str) -> Option<ExecutionState> {
        self.executions.read().await.get(execution_id).cloned()
    }

    /// Request cooperative cancellation. Returns `false` for unknown or
    /// already-finished executions.
    pub async fn cancel(&self, execution_id: &str) -> bool {
        let cancellations = self.cancellations.read().await;
        match cancellations.get(execution_id) {
            Some(tx) => tx.send(true).is_ok(),
            None => false,
        }
    }
}
