//! Round-number pattern detection.
//!
//! Genuine trade values are messy; an invoice where most monetary amounts
//! land exactly on hundreds or thousands suggests values were invented
//! rather than computed.

use async_trait::async_trait;

use fraudhound_core::document::DocumentBundle;
use fraudhound_core::error::ToolError;
use fraudhound_core::tool::{InvestigationTool, ToolId};

use crate::numeric::labeled_values;

const VALUE_LABELS: [&str; 5] = ["total value", "amount", "value", "price", "total"];

/// Share of round values at which the pattern is flagged.
const ROUND_SHARE_THRESHOLD: f64 = 0.6;

/// Minimum sample before the share is meaningful.
const MIN_VALUES: usize = 3;

pub struct RoundNumberPatternTool;

fn is_round(value: f64) -> bool {
    value >= 100.0 && value.fract() == 0.0 && (value as i64) % 100 == 0
}

#[async_trait]
impl InvestigationTool for RoundNumberPatternTool {
    fn id(&self) -> ToolId {
        ToolId::DetectRoundNumberPatterns
    }

    fn describe(&self) -> &str {
        "Detect suspicious round-number patterns in declared monetary values."
    }

    async fn execute(
        &self,
        bundle: &DocumentBundle,
        _options: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let values: Vec<f64> = bundle
            .documents
            .iter()
            .flat_map(|d| labeled_values(&d.content, &VALUE_LABELS))
            .filter(|v| *v >= 1.0)
            .collect();

        let mut report = String::from("ROUND NUMBER PATTERN ANALYSIS:\n");
        if values.len() < MIN_VALUES {
            report.push_str(&format!(
                "Status: INCONCLUSIVE\nOnly {} monetary values found (need {MIN_VALUES}).\n",
                values.len()
            ));
            return Ok(report);
        }

        let round = values.iter().filter(|v| is_round(**v)).count();
        let share = round as f64 / values.len() as f64;

        if share >= ROUND_SHARE_THRESHOLD {
            report.push_str(&format!(
                "Status: FAIL\n\
                 - {round} of {} declared values are suspicious round numbers \
                 ({:.0}% of sample)\n\
                 Risk: values may be fabricated rather than computed.\n",
                values.len(),
                share * 100.0
            ));
        } else {
            report.push_str(&format!(
                "Status: PASS\n{round} of {} values are round — within normal range.\n",
                values.len()
            ));
        }
        Ok(report)
    }
}
