//! Document model — the ingested corpus an investigation runs over.
//!
//! Documents are immutable after ingestion. Classification may refine a
//! document's kind during observation, but the raw text and metadata never
//! change once a bundle has been handed to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of document kinds the engine understands.
///
/// Anything the classifier cannot place lands in `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CommercialInvoice,
    PackingList,
    BillOfLading,
    CertificateOfOrigin,
    CustomsDeclaration,
    Other,
}

impl DocumentKind {
    /// The canonical wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommercialInvoice => "commercial_invoice",
            Self::PackingList => "packing_list",
            Self::BillOfLading => "bill_of_lading",
            Self::CertificateOfOrigin => "certificate_of_origin",
            Self::CustomsDeclaration => "customs_declaration",
            Self::Other => "other",
        }
    }

    /// Parse a wire name. Unrecognized names map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "commercial_invoice" => Self::CommercialInvoice,
            "packing_list" => Self::PackingList,
            "bill_of_lading" => Self::BillOfLading,
            "certificate_of_origin" => Self::CertificateOfOrigin,
            "customs_declaration" => Self::CustomsDeclaration,
            _ => Self::Other,
        }
    }

    /// The kinds every complete shipment bundle must carry.
    pub fn required() -> [DocumentKind; 3] {
        [
            Self::CommercialInvoice,
            Self::PackingList,
            Self::BillOfLading,
        ]
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Original filename — doubles as the document id within a bundle.
    pub filename: String,

    /// Kind tag. `Other` until classification refines it.
    pub kind: DocumentKind,

    /// Raw extracted text.
    pub content: String,

    /// Free-form ingestion metadata.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// When the document entered the system.
    pub ingested_at: DateTime<Utc>,
}

impl Document {
    /// Create a document with the given kind.
    pub fn new(filename: impl Into<String>, kind: DocumentKind, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            content: content.into(),
            metadata: serde_json::Map::new(),
            ingested_at: Utc::now(),
        }
    }

    /// Create a document of unknown kind (classified later).
    pub fn untyped(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(filename, DocumentKind::Other, content)
    }

    /// A truncated content sample for classification prompts.
    pub fn sample(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// The full corpus handed to one investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBundle {
    pub bundle_id: String,
    pub documents: Vec<Document>,
}

impl DocumentBundle {
    pub fn new(bundle_id: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            documents,
        }
    }

    /// Generate a bundle with a fresh short id, matching ingestion defaults.
    pub fn with_generated_id(documents: Vec<Document>) -> Self {
        let id = format!("bundle_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        Self::new(id, documents)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All kind tags present in the bundle.
    pub fn kinds(&self) -> Vec<DocumentKind> {
        self.documents.iter().map(|d| d.kind).collect()
    }

    /// First document of the given kind, if any.
    pub fn get_by_kind(&self, kind: DocumentKind) -> Option<&Document> {
        self.documents.iter().find(|d| d.kind == kind)
    }

    /// Whether the invoice / packing list / bill-of-lading triple is present.
    pub fn has_required_documents(&self) -> bool {
        let kinds = self.kinds();
        DocumentKind::required().iter().all(|k| kinds.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trip() {
        for kind in [
            DocumentKind::CommercialInvoice,
            DocumentKind::PackingList,
            DocumentKind::BillOfLading,
            DocumentKind::CertificateOfOrigin,
            DocumentKind::CustomsDeclaration,
            DocumentKind::Other,
        ] {
            assert_eq!(DocumentKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_kind_parses_to_other() {
        assert_eq!(DocumentKind::parse("tax_form"), DocumentKind::Other);
        assert_eq!(DocumentKind::parse(""), DocumentKind::Other);
        assert_eq!(
            DocumentKind::parse("  Commercial_Invoice "),
            DocumentKind::CommercialInvoice
        );
    }

    #[test]
    fn sample_respects_char_boundaries() {
        let doc = Document::untyped("inv.txt", "héllo wörld");
        assert_eq!(doc.sample(5), "héllo");
        assert_eq!(doc.sample(1000), "héllo wörld");
    }

    #[test]
    fn required_documents_check() {
        let bundle = DocumentBundle::new(
            "b1",
            vec![
                Document::new("inv.txt", DocumentKind::CommercialInvoice, "..."),
                Document::new("pack.txt", DocumentKind::PackingList, "..."),
            ],
        );
        assert!(!bundle.has_required_documents());

        let bundle = DocumentBundle::new(
            "b2",
            vec![
                Document::new("inv.txt", DocumentKind::CommercialInvoice, "..."),
                Document::new("pack.txt", DocumentKind::PackingList, "..."),
                Document::new("bol.txt", DocumentKind::BillOfLading, "..."),
            ],
        );
        assert!(bundle.has_required_documents());
    }

    #[test]
    fn generated_bundle_id_prefix() {
        let bundle = DocumentBundle::with_generated_id(vec![]);
        assert!(bundle.bundle_id.starts_with("bundle_"));
        assert_eq!(bundle.bundle_id.len(), "bundle_".len() + 8);
    }
}
