//! Weight consistency check between packing list and bill of lading.
//! Diverging gross weights point at product substitution or quantity
//! manipulation.

use async_trait::async_trait;

use fraudhound_core::document::{DocumentBundle, DocumentKind};
use fraudhound_core::error::ToolError;
use fraudhound_core::tool::{InvestigationTool, ToolId};

use crate::numeric::{first_labeled_value, relative_diff};

const WEIGHT_LABELS: [&str; 4] = ["gross weight", "net weight", "total weight", "weight"];

/// Shipping-side rounding headroom before a weight pair is flagged.
const TOLERANCE: f64 = 0.05;

pub struct WeightConsistencyTool;

#[async_trait]
impl InvestigationTool for WeightConsistencyTool {
    fn id(&self) -> ToolId {
        ToolId::ValidateWeightConsistency
    }

    fn describe(&self) -> &str {
        "Validate that declared weights are consistent across packing list and bill of lading."
    }

    async fn execute(
        &self,
        bundle: &DocumentBundle,
        _options: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let mut declared: Vec<(DocumentKind, f64)> = Vec::new();
        for kind in [DocumentKind::PackingList, DocumentKind::BillOfLading] {
            if let Some(doc) = bundle.get_by_kind(kind) {
                if let Some(weight) = first_labeled_value(&doc.content, &WEIGHT_LABELS) {
                    declared.push((kind, weight));
                }
            }
        }

        let mut report = String::from("WEIGHT CONSISTENCY ANALYSIS:\n");
        match declared.as_slice() {
            [(kind_a, a), (kind_b, b)] => {
                let diff = relative_diff(*a, *b);
                if diff > TOLERANCE {
                    report.push_str(&format!(
                        "Status: FAIL\n\
                         - Weight discrepancy: {kind_a} declares {a}, {kind_b} declares {b} \
                         ({:.1}% apart)\n\
                         Risk: possible product substitution or weight manipulation.\n",
                        diff * 100.0
                    ));
                } else {
                    report.push_str(&format!(
                        "Status: PASS\nDeclared weights agree: {kind_a} {a}, {kind_b} {b}.\n"
                    ));
                }
            }
            _ => {
                report.push_str(
                    "Status: INCONCLUSIVE\n\
                     Need a declared weight on both packing list and bill of lading.\n",
                );
            }
        }
        Ok(report)
    }
}
