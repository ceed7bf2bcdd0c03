//! Document classification capabilities.
//!
//! Two implementations with the same contract:
//!
//! - [`LlmClassifier`] asks the reasoning capability to tag the document
//!   and parses the answer, falling back to `Other` when the reply is not
//!   a recognized kind.
//! - [`KeywordClassifier`] matches filename and content keywords — no
//!   network, deterministic, used when no LLM is configured and as the
//!   grounding for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use fraudhound_core::capability::{Classify, Reason};
use fraudhound_core::document::DocumentKind;
use fraudhound_core::error::CapabilityError;

/// How much document text is handed to the classification prompt.
const SAMPLE_CHARS: usize = 1000;

/// LLM-backed classifier layered on a [`Reason`] capability.
pub struct LlmClassifier {
    reasoner: Arc<dyn Reason>,
}

impl LlmClassifier {
    pub fn new(reasoner: Arc<dyn Reason>) -> Self {
        Self { reasoner }
    }

    fn build_prompt(filename: &str, sample: &str) -> String {
        format!(
            "Classify this document based on its filename and content.\n\
             \n\
             Filename: {filename}\n\
             Content: {sample}\n\
             \n\
             Document types to choose from:\n\
             - commercial_invoice\n\
             - packing_list\n\
             - bill_of_lading\n\
             - certificate_of_origin\n\
             - customs_declaration\n\
             - other\n\
             \n\
             Return only the document type name."
        )
    }
}

#[async_trait]
impl Classify for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(
        &self,
        filename: &str,
        content_sample: &str,
    ) -> Result<DocumentKind, CapabilityError> {
        let sample: String = content_sample.chars().take(SAMPLE_CHARS).collect();
        let prompt = Self::build_prompt(filename, &sample);
        let response = self.reasoner.reason(&prompt).await?;
        Ok(DocumentKind::parse(&response))
    }
}

/// Deterministic filename/content keyword classifier.
///
/// The filename wins when it is unambiguous; otherwise content keywords
/// decide, and anything unmatched is `Other`.
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn from_filename(filename: &str) -> Option<DocumentKind> {
        let name = filename.to_lowercase();
        if name.contains("invoice") {
            Some(DocumentKind::CommercialInvoice)
        } else if name.contains("packing") || name.contains("pack") {
            Some(DocumentKind::PackingList)
        } else if name.contains("bill") && name.contains("lading") {
            Some(DocumentKind::BillOfLading)
        } else if name.contains("origin") || name.contains("certificate") {
            Some(DocumentKind::CertificateOfOrigin)
        } else if name.contains("customs") || name.contains("declaration") {
            Some(DocumentKind::CustomsDeclaration)
        } else {
            None
        }
    }

    fn from_content(content: &str) -> Option<DocumentKind> {
        let text = content.to_lowercase();
        if text.contains("invoice") {
            Some(DocumentKind::CommercialInvoice)
        } else if text.contains("packing") {
            Some(DocumentKind::PackingList)
        } else if text.contains("lading") {
            Some(DocumentKind::BillOfLading)
        } else if text.contains("origin") {
            Some(DocumentKind::CertificateOfOrigin)
        } else if text.contains("customs") {
            Some(DocumentKind::CustomsDeclaration)
        } else {
            None
        }
    }
}

#[async_trait]
impl Classify for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(
        &self,
        filename: &str,
        content_sample: &str,
    ) -> Result<DocumentKind, CapabilityError> {
        let kind = Self::from_filename(filename)
            .or_else(|| Self::from_content(content_sample))
            .unwrap_or(DocumentKind::Other);
        if kind == DocumentKind::Other {
            warn!(filename, "Could not classify document from keywords");
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Reasoner returning a fixed reply.
    struct FixedReasoner(String);

    #[async_trait]
    impl Reason for FixedReasoner {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn reason(&self, _prompt: &str) -> Result<String, CapabilityError> {
            Ok(self.0.clone())
        }
    }

    /// Reasoner recording the prompt it was given.
    struct RecordingReasoner(Mutex<String>);

    #[async_trait]
    impl Reason for RecordingReasoner {
        fn name(&self) -> &str {
            "recording"
        }
        async fn reason(&self, prompt: &str) -> Result<String, CapabilityError> {
            *self.0.lock().unwrap() = prompt.to_string();
            Ok("packing_list".into())
        }
    }

    #[tokio::test]
    async fn llm_classifier_parses_reply() {
        let classifier = LlmClassifier::new(Arc::new(FixedReasoner("commercial_invoice\n".into())));
        let kind = classifier.classify("a.pdf", "some text").await.unwrap();
        assert_eq!(kind, DocumentKind::CommercialInvoice);
    }

    #[tokio::test]
    async fn llm_classifier_unknown_reply_is_other() {
        let classifier = LlmClassifier::new(Arc::new(FixedReasoner("I think it's a receipt".into())));
        let kind = classifier.classify("a.pdf", "some text").await.unwrap();
        assert_eq!(kind, DocumentKind::Other);
    }

    #[tokio::test]
    async fn llm_classifier_truncates_sample() {
        let reasoner = Arc::new(RecordingReasoner(Mutex::new(String::new())));
        let classifier = LlmClassifier::new(reasoner.clone());
        let long = "x".repeat(5000);
        classifier.classify("big.txt", &long).await.unwrap();
        let prompt = reasoner.0.lock().unwrap().clone();
        assert!(prompt.len() < 2500);
    }

    #[tokio::test]
    async fn keyword_classifier_filename_rules() {
        let c = KeywordClassifier;
        assert_eq!(
            c.classify("commercial_invoice_001.pdf", "").await.unwrap(),
            DocumentKind::CommercialInvoice
        );
        assert_eq!(
            c.classify("packing-list.txt", "").await.unwrap(),
            DocumentKind::PackingList
        );
        assert_eq!(
            c.classify("bill_of_lading.txt", "").await.unwrap(),
            DocumentKind::BillOfLading
        );
        assert_eq!(
            c.classify("cert_of_origin.txt", "").await.unwrap(),
            DocumentKind::CertificateOfOrigin
        );
        assert_eq!(
            c.classify("customs_decl.txt", "").await.unwrap(),
            DocumentKind::CustomsDeclaration
        );
    }

    #[tokio::test]
    async fn keyword_classifier_falls_back_to_content() {
        let c = KeywordClassifier;
        assert_eq!(
            c.classify("doc1.txt", "PACKING LIST\nitems: ...").await.unwrap(),
            DocumentKind::PackingList
        );
        assert_eq!(
            c.classify("doc2.txt", "total mystery").await.unwrap(),
            DocumentKind::Other
        );
    }
}
