//! Quantity consistency check across invoice, packing list, and bill of
//! lading. Quantity discrepancies between documents are a classic marker of
//! quantity manipulation.

use async_trait::async_trait;

use fraudhound_core::document::{DocumentBundle, DocumentKind};
use fraudhound_core::error::ToolError;
use fraudhound_core::tool::{InvestigationTool, ToolId};

use crate::numeric::{first_labeled_value, relative_diff};

const QUANTITY_LABELS: [&str; 4] = ["total quantity", "quantity", "qty", "pieces"];

/// Mismatch tolerance before a pair of documents is flagged.
const TOLERANCE: f64 = 0.01;

pub struct QuantityConsistencyTool;

#[async_trait]
impl InvestigationTool for QuantityConsistencyTool {
    fn id(&self) -> ToolId {
        ToolId::ValidateQuantityConsistency
    }

    fn describe(&self) -> &str {
        "Validate that quantities are consistent across invoice, packing list, and bill of lading."
    }

    async fn execute(
        &self,
        bundle: &DocumentBundle,
        _options: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let mut declared: Vec<(DocumentKind, f64)> = Vec::new();
        for kind in [
            DocumentKind::CommercialInvoice,
            DocumentKind::PackingList,
            DocumentKind::BillOfLading,
        ] {
            if let Some(doc) = bundle.get_by_kind(kind) {
                if let Some(qty) = first_labeled_value(&doc.content, &QUANTITY_LABELS) {
                    declared.push((kind, qty));
                }
            }
        }

        if declared.len() < 2 {
            return Ok(
                "QUANTITY CONSISTENCY ANALYSIS:\nStatus: INCONCLUSIVE\n\
                 Fewer than two documents declare a quantity; nothing to cross-check."
                    .into(),
            );
        }

        let mut findings = Vec::new();
        for i in 0..declared.len() {
            for j in (i + 1)..declared.len() {
                let (kind_a, a) = declared[i];
                let (kind_b, b) = declared[j];
                if relative_diff(a, b) > TOLERANCE {
                    findings.push(format!(
                        "Quantity discrepancy: {kind_a} declares {a}, {kind_b} declares {b}"
                    ));
                }
            }
        }

        let mut report = String::from("QUANTITY CONSISTENCY ANALYSIS:\n");
        if findings.is_empty() {
            report.push_str("Status: PASS\nDeclared quantities agree across documents:\n");
            for (kind, qty) in &declared {
                report.push_str(&format!("- {kind}: {qty}\n"));
            }
        } else {
            report.push_str("Status: FAIL\n");
            for finding in &findings {
                report.push_str(&format!("- {finding}\n"));
            }
            report.push_str("Risk: possible quantity manipulation.\n");
        }
        Ok(report)
    }
}
