//! `fraudhound serve` — start the HTTP gateway.

use std::sync::Arc;

use fraudhound_config::AppConfig;
use fraudhound_engine::InvestigationService;
use fraudhound_gateway::GatewayState;

pub async fn run(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let (reasoner, classifier) = fraudhound_capabilities::build_from_config(&config.provider);
    let service = Arc::new(InvestigationService::new(
        reasoner,
        classifier,
        Arc::new(fraudhound_tools::default_registry()),
        config.engine.clone(),
    ));

    let state = Arc::new(GatewayState {
        service,
        started_at: chrono::Utc::now(),
    });

    fraudhound_gateway::serve(state, &config.gateway)
        .await
        .map_err(|e| anyhow::anyhow!("gateway error: {e}"))
}
