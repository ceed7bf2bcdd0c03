//! `fraudhound analyze` — one-shot investigation over files on disk.
//!
//! Every readable UTF-8 file in the directory becomes one document; kinds
//! are left for the observation stage to classify. The final execution
//! state is printed as JSON.

use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use fraudhound_config::AppConfig;
use fraudhound_core::document::{Document, DocumentBundle};
use fraudhound_engine::{InvestigationOptions, InvestigationService};

pub async fn run(
    config: AppConfig,
    dir: &Path,
    max_iterations: Option<u32>,
) -> anyhow::Result<()> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match std::fs::read_to_string(&path) {
            Ok(content) => documents.push(Document::untyped(filename, content)),
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }

    if documents.is_empty() {
        anyhow::bail!("no readable documents in {}", dir.display());
    }

    let (reasoner, classifier) = fraudhound_capabilities::build_from_config(&config.provider);
    let service = InvestigationService::new(
        reasoner,
        classifier,
        Arc::new(fraudhound_tools::default_registry()),
        config.engine.clone(),
    );

    let bundle = DocumentBundle::with_generated_id(documents);
    let state = service
        .start_investigation(
            bundle,
            InvestigationOptions {
                max_iterations,
                confidence_threshold: None,
            },
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
