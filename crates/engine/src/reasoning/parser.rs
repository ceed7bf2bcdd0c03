//! Line-oriented parser for reasoning responses.
//!
//! The only structure assumed of the reasoning capability is the
//! `KEY: value` convention:
//!
//! ```text
//! REASONING: quantities disagree between invoice and packing list
//! RECOMMENDED_ACTION: validate_quantity_consistency
//! CONFIDENCE: 0.8
//! REASONING_TYPE: validation
//! ```
//!
//! Free text is fragile, so every field has a documented fallback:
//!
//! - no `REASONING` line → the whole response becomes the rationale
//! - no / unknown `RECOMMENDED_ACTION` value → kept verbatim here; the
//!   dispatcher resolves unknown names to synthesis. A missing key
//!   defaults to the synthesis action outright.
//! - missing or non-numeric `CONFIDENCE` → 0.5, then clamped to [0, 1]
//! - missing or unknown `REASONING_TYPE` → investigation
//!
//! First occurrence of each key wins; later duplicates are ignored.

use fraudhound_core::tool::ToolId;

use super::{Reasoning, ReasoningKind};

const KEY_REASONING: &str = "REASONING:";
const KEY_ACTION: &str = "RECOMMENDED_ACTION:";
const KEY_CONFIDENCE: &str = "CONFIDENCE:";
const KEY_TYPE: &str = "REASONING_TYPE:";

/// Parse a raw reasoning response into a [`Reasoning`].
pub fn parse_reasoning(response: &str) -> Reasoning {
    let mut rationale: Option<String> = None;
    let mut action: Option<String> = None;
    let mut confidence: Option<f64> = None;
    let mut kind: Option<ReasoningKind> = None;

    for line in response.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(KEY_REASONING) {
            rationale.get_or_insert_with(|| rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(KEY_ACTION) {
            action.get_or_insert_with(|| rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(KEY_CONFIDENCE) {
            if confidence.is_none() {
                confidence = rest.trim().parse::<f64>().ok();
                // A present-but-unparseable value still consumes the key.
                confidence.get_or_insert(0.5);
            }
        } else if let Some(rest) = line.strip_prefix(KEY_TYPE) {
            kind.get_or_insert_with(|| ReasoningKind::parse(rest));
        }
    }

    // An unparsed response is still a rationale — the text just was not
    // structured the way we asked.
    let rationale = match rationale {
        Some(r) if !r.is_empty() => r,
        _ => response.trim().to_string(),
    };

    Reasoning {
        rationale,
        recommended_action: action
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| ToolId::SynthesizeFraudEvidence.as_str().to_string()),
        confidence: confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        kind: kind.unwrap_or(ReasoningKind::Investigation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Golden fixtures for malformed input — the fallbacks are contract,
    // not incidental behavior.

    #[test]
    fn well_formed_response() {
        let reasoning = parse_reasoning(
            "REASONING: done\n\
             RECOMMENDED_ACTION: synthesize_fraud_evidence\n\
             CONFIDENCE: 0.9\n\
             REASONING_TYPE: synthesis",
        );
        assert_eq!(reasoning.rationale, "done");
        assert_eq!(reasoning.recommended_action, "synthesize_fraud_evidence");
        assert_eq!(reasoning.confidence, 0.9);
        assert_eq!(reasoning.kind, ReasoningKind::Synthesis);
    }

    #[test]
    fn completely_unstructured_text() {
        let reasoning = parse_reasoning("I'm not sure what to do here, honestly.");
        assert_eq!(reasoning.rationale, "I'm not sure what to do here, honestly.");
        assert_eq!(reasoning.recommended_action, "synthesize_fraud_evidence");
        assert_eq!(reasoning.confidence, 0.5);
        assert_eq!(reasoning.kind, ReasoningKind::Investigation);
    }

    #[test]
    fn empty_response() {
        let reasoning = parse_reasoning("");
        assert_eq!(reasoning.rationale, "");
        assert_eq!(reasoning.recommended_action, "synthesize_fraud_evidence");
        assert_eq!(reasoning.confidence, 0.5);
        assert_eq!(reasoning.kind, ReasoningKind::Investigation);
    }

    #[test]
    fn partial_keys() {
        let reasoning = parse_reasoning(
            "REASONING: need more evidence\nRECOMMENDED_ACTION: validate_weight_consistency",
        );
        assert_eq!(reasoning.rationale, "need more evidence");
        assert_eq!(reasoning.recommended_action, "validate_weight_consistency");
        assert_eq!(reasoning.confidence, 0.5);
        assert_eq!(reasoning.kind, ReasoningKind::Investigation);
    }

    #[test]
    fn non_numeric_confidence_defaults() {
        let reasoning = parse_reasoning("CONFIDENCE: quite high");
        assert_eq!(reasoning.confidence, 0.5);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        assert_eq!(parse_reasoning("CONFIDENCE: 7.5").confidence, 1.0);
        assert_eq!(parse_reasoning("CONFIDENCE: -2").confidence, 0.0);
    }

    #[test]
    fn unknown_reasoning_type_defaults() {
        let reasoning = parse_reasoning("REASONING_TYPE: speculation");
        assert_eq!(reasoning.kind, ReasoningKind::Investigation);
    }

    #[test]
    fn unknown_action_kept_verbatim_for_dispatcher() {
        let reasoning = parse_reasoning("RECOMMENDED_ACTION: call_interpol");
        assert_eq!(reasoning.recommended_action, "call_interpol");
    }

    #[test]
    fn first_occurrence_wins() {
        let reasoning = parse_reasoning(
            "CONFIDENCE: 0.2\nCONFIDENCE: 0.9\nREASONING: first\nREASONING: second",
        );
        assert_eq!(reasoning.confidence, 0.2);
        assert_eq!(reasoning.rationale, "first");
    }

    #[test]
    fn surrounding_whitespace_tolerated() {
        let reasoning =
            parse_reasoning("   REASONING:    padded rationale   \n  CONFIDENCE:  0.3  ");
        assert_eq!(reasoning.rationale, "padded rationale");
        assert_eq!(reasoning.confidence, 0.3);
    }

    #[test]
    fn keys_are_case_sensitive() {
        // Lowercase keys are prose, not structure.
        let reasoning = parse_reasoning("reasoning: lowercase is not a key");
        assert_eq!(reasoning.rationale, "reasoning: lowercase is not a key");
        assert_eq!(reasoning.confidence, 0.5);
    }

    #[test]
    fn keys_interleaved_with_prose() {
        let reasoning = parse_reasoning(
            "Let me think about this.\n\
             REASONING: weights look off\n\
             Some stray commentary.\n\
             CONFIDENCE: 0.65\n",
        );
        assert_eq!(reasoning.rationale, "weights look off");
        assert_eq!(reasoning.confidence, 0.65);
    }
}
