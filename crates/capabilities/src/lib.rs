//! Capability client implementations for fraudhound.
//!
//! The engine consumes two opaque capabilities — reasoning and document
//! classification. This crate provides the production implementations:
//! an OpenAI-compatible HTTP reasoner and two classifiers (LLM-backed and
//! a keyword fallback that needs no network at all).

pub mod classifier;
pub mod openai_compat;

use std::sync::Arc;

use fraudhound_config::ProviderConfig;
use fraudhound_core::{Classify, Reason};

pub use classifier::{KeywordClassifier, LlmClassifier};
pub use openai_compat::OpenAiCompatReasoner;

/// Build the reasoning + classification pair from configuration.
///
/// With an API key both capabilities are LLM-backed; without one the
/// keyword classifier alone is returned so offline analysis still works,
/// and the reasoner reports `NotConfigured` on every call (which the
/// engine degrades into its fallback path).
pub fn build_from_config(config: &ProviderConfig) -> (Arc<dyn Reason>, Arc<dyn Classify>) {
    match &config.api_key {
        Some(key) => {
            let reasoner: Arc<dyn Reason> = Arc::new(OpenAiCompatReasoner::new(
                &config.api_url,
                key,
                &config.model,
                config.temperature,
            ));
            let classifier: Arc<dyn Classify> = Arc::new(LlmClassifier::new(reasoner.clone()));
            (reasoner, classifier)
        }
        None => {
            let reasoner: Arc<dyn Reason> = Arc::new(openai_compat::UnconfiguredReasoner);
            let classifier: Arc<dyn Classify> = Arc::new(KeywordClassifier);
            (reasoner, classifier)
        }
    }
}
