//! Consumed external capabilities — reasoning and classification.
//!
//! Both are opaque text-in/text-out collaborators. The engine assumes no
//! structure beyond what the reasoning-stage parser extracts from the
//! response, and every implementation must be safe for concurrent use:
//! one shared client serves many simultaneous investigations.

use async_trait::async_trait;

use crate::document::DocumentKind;
use crate::error::CapabilityError;

/// The reasoning capability: free text in, free text out.
///
/// Implementations: OpenAI-compatible HTTP endpoints, scripted test doubles.
#[async_trait]
pub trait Reason: Send + Sync {
    /// A human-readable name for this capability (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Send a prompt and return the raw response text.
    async fn reason(&self, prompt: &str) -> std::result::Result<String, CapabilityError>;
}

/// The classification capability: tag a document with a kind.
///
/// Callers treat failures as recoverable — a document that cannot be
/// classified keeps its ingested kind rather than aborting the cycle.
#[async_trait]
pub trait Classify: Send + Sync {
    fn name(&self) -> &str;

    /// Classify a document from its filename and a content sample.
    async fn classify(
        &self,
        filename: &str,
        content_sample: &str,
    ) -> std::result::Result<DocumentKind, CapabilityError>;
}
