//! Observation builder — the read-only snapshot consumed by reasoning.
//!
//! `observe` never mutates memory and never fails: a document the
//! classifier cannot place keeps its ingested kind, and structural risk
//! indicators are computed from whatever classification succeeded.

use std::sync::Arc;
use tracing::warn;

use fraudhound_core::capability::Classify;
use fraudhound_core::document::{Document, DocumentBundle, DocumentKind};

use crate::memory::ExecutionMemory;

/// How much document text is sampled for classification.
const CLASSIFY_SAMPLE_CHARS: usize = 1000;

/// Document count above which a bundle is considered complex.
const COMPLEX_BUNDLE_THRESHOLD: usize = 4;

/// A point-in-time snapshot of the investigation. Created fresh every
/// cycle; never mutated.
#[derive(Debug, Clone)]
pub struct Observation {
    pub total_documents: usize,

    /// Per-document classification, aligned with bundle order.
    pub document_kinds: Vec<(String, DocumentKind)>,

    /// Human-readable inventory plus strategy hint.
    pub content_summary: String,

    /// Structural risk indicators found this cycle.
    pub risk_indicators: Vec<String>,

    /// Accumulated state copied from memory for reasoning visibility.
    pub fraud_indicators: Vec<String>,
    pub evidence_count: usize,
    pub executed_tools: Vec<String>,
    pub iteration: u32,
    pub confidence: f64,
}

impl Observation {
    /// The classified kind set present this cycle.
    pub fn kinds(&self) -> Vec<DocumentKind> {
        self.document_kinds.iter().map(|(_, k)| *k).collect()
    }

    /// Rebuild a bundle snapshot carrying this observation's kinds, for
    /// handing to the action dispatcher.
    pub fn classified_bundle(&self, bundle: &DocumentBundle) -> DocumentBundle {
        let documents = bundle
            .documents
            .iter()
            .map(|doc| {
                let kind = self
                    .document_kinds
                    .iter()
                    .find(|(name, _)| *name == doc.filename)
                    .map(|(_, k)| *k)
                    .unwrap_or(doc.kind);
                Document {
                    kind,
                    ..doc.clone()
                }
            })
            .collect();
        DocumentBundle::new(bundle.bundle_id.clone(), documents)
    }
}

/// Builds observations, classifying documents through the `Classify`
/// capability.
pub struct Observer {
    classifier: Arc<dyn Classify>,
}

impl Observer {
    pub fn new(classifier: Arc<dyn Classify>) -> Self {
        Self { classifier }
    }

    /// Produce the snapshot for the current cycle.
    pub async fn observe(&self, bundle: &DocumentBundle, memory: &ExecutionMemory) -> Observation {
        let document_kinds = self.classify_documents(bundle).await;
        let kinds: Vec<DocumentKind> = document_kinds.iter().map(|(_, k)| *k).collect();

        let risk_indicators = Self::risk_indicators(bundle, &kinds);
        let content_summary = Self::summarize(bundle, &document_kinds, &kinds);

        Observation {
            total_documents: bundle.len(),
            document_kinds,
            content_summary,
            risk_indicators,
            fraud_indicators: memory.fraud_indicators().to_vec(),
            evidence_count: memory.evidence().len(),
            executed_tools: memory.executed_tools().to_vec(),
            iteration: memory.iteration(),
            confidence: memory.confidence(),
        }
    }

    /// Classify each still-untagged document; failures keep the ingested
    /// kind rather than aborting the cycle.
    async fn classify_documents(&self, bundle: &DocumentBundle) -> Vec<(String, DocumentKind)> {
        let mut out = Vec::with_capacity(bundle.len());
        for doc in &bundle.documents {
            let kind = if doc.kind == DocumentKind::Other {
                match self
                    .classifier
                    .classify(&doc.filename, doc.sample(CLASSIFY_SAMPLE_CHARS))
                    .await
                {
                    Ok(kind) => kind,
                    Err(e) => {
                        warn!(filename = %doc.filename, error = %e, "Could not classify document");
                        doc.kind
                    }
                }
            } else {
                doc.kind
            };
            out.push((doc.filename.clone(), kind));
        }
        out
    }

    fn risk_indicators(bundle: &DocumentBundle, kinds: &[DocumentKind]) -> Vec<String> {
        let mut indicators = Vec::new();
        if !DocumentKind::required().iter().all(|k| kinds.contains(k)) {
            indicators.push("Missing required documents".to_string());
        }
        if bundle.len() > COMPLEX_BUNDLE_THRESHOLD {
            indicators.push("Complex document bundle".to_string());
        }
        indicators
    }

    fn summarize(
        bundle: &DocumentBundle,
        document_kinds: &[(String, DocumentKind)],
        kinds: &[DocumentKind],
    ) -> String {
        let mut summary = format!("{} document(s) under review: ", bundle.len());
        let inventory: Vec<String> = document_kinds
            .iter()
            .map(|(name, kind)| format!("{name} ({kind})"))
            .collect();
        summary.push_str(&inventory.join(", "));

        let has_required = DocumentKind::required().iter().all(|k| kinds.contains(k));
        summary.push_str(&format!(
            ". Required documents present: {}.",
            if has_required { "YES" } else { "NO" }
        ));

        summary.push_str(&format!(" Strategy: {}.", Self::strategy(kinds)));
        summary
    }

    /// Initial strategy hint from the kinds at hand.
    fn strategy(kinds: &[DocumentKind]) -> &'static str {
        let has_invoice = kinds.contains(&DocumentKind::CommercialInvoice);
        let has_packing = kinds.contains(&DocumentKind::PackingList);
        if has_invoice && has_packing {
            "start with quantity and weight consistency validation"
        } else if has_invoice {
            "focus on value and calculation validation"
        } else {
            "begin with available document analysis"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingClassifier, FixedClassifier};
    use fraudhound_core::document::Document;

    fn untyped_bundle() -> DocumentBundle {
        DocumentBundle::new(
            "b1",
            vec![
                Document::untyped("invoice.txt", "Commercial Invoice ..."),
                Document::untyped("packing.txt", "Packing List ..."),
            ],
        )
    }

    #[tokio::test]
    async fn classifies_untagged_documents() {
        let observer = Observer::new(Arc::new(FixedClassifier(DocumentKind::CommercialInvoice)));
        let memory = ExecutionMemory::new("e1", "b1");
        let obs = observer.observe(&untyped_bundle(), &memory).await;

        assert_eq!(obs.total_documents, 2);
        assert!(obs
            .kinds()
            .iter()
            .all(|k| *k == DocumentKind::CommercialInvoice));
    }

    #[tokio::test]
    async fn classification_failure_falls_back_to_ingested_kind() {
        let observer = Observer::new(Arc::new(FailingClassifier));
        let memory = ExecutionMemory::new("e1", "b1");
        let obs = observer.observe(&untyped_bundle(), &memory).await;

        assert!(obs.kinds().iter().all(|k| *k == DocumentKind::Other));
        // Missing required documents must be flagged, not an error.
        assert!(obs
            .risk_indicators
            .contains(&"Missing required documents".to_string()));
    }

    #[tokio::test]
    async fn pre_tagged_documents_are_not_reclassified() {
        let bundle = DocumentBundle::new(
            "b1",
            vec![Document::new(
                "bol.txt",
                DocumentKind::BillOfLading,
                "B/L ...",
            )],
        );
        // A classifier that would mislabel everything if consulted.
        let observer = Observer::new(Arc::new(FixedClassifier(DocumentKind::PackingList)));
        let memory = ExecutionMemory::new("e1", "b1");
        let obs = observer.observe(&bundle, &memory).await;
        assert_eq!(obs.kinds(), vec![DocumentKind::BillOfLading]);
    }

    #[tokio::test]
    async fn complex_bundle_is_flagged() {
        let documents = (0..5)
            .map(|i| Document::new(format!("doc{i}.txt"), DocumentKind::Other, "x"))
            .collect();
        let bundle = DocumentBundle::new("b1", documents);
        let observer = Observer::new(Arc::new(FailingClassifier));
        let memory = ExecutionMemory::new("e1", "b1");
        let obs = observer.observe(&bundle, &memory).await;
        assert!(obs
            .risk_indicators
            .contains(&"Complex document bundle".to_string()));
    }

    #[tokio::test]
    async fn copies_accumulated_state_from_memory() {
        let observer = Observer::new(Arc::new(FailingClassifier));
        let mut memory = ExecutionMemory::new("e1", "b1");
        memory.add_indicator("Missing required documents");
        memory.add_evidence("qty mismatch");
        memory.record_tool("validate_quantity_consistency");
        memory.begin_iteration();
        memory.set_confidence(0.4);

        let obs = observer.observe(&untyped_bundle(), &memory).await;
        assert_eq!(obs.fraud_indicators.len(), 1);
        assert_eq!(obs.evidence_count, 1);
        assert_eq!(
            obs.executed_tools,
            vec!["validate_quantity_consistency".to_string()]
        );
        assert_eq!(obs.iteration, 1);
        assert_eq!(obs.confidence, 0.4);
    }

    #[tokio::test]
    async fn classified_bundle_applies_kinds() {
        let observer = Observer::new(Arc::new(FixedClassifier(DocumentKind::PackingList)));
        let memory = ExecutionMemory::new("e1", "b1");
        let bundle = untyped_bundle();
        let obs = observer.observe(&bundle, &memory).await;
        let classified = obs.classified_bundle(&bundle);
        assert!(classified
            .documents
            .iter()
            .all(|d| d.kind == DocumentKind::PackingList));
        // The source bundle stays untouched.
        assert!(bundle.documents.iter().all(|d| d.kind == DocumentKind::Other));
    }
}
