//! Final assessment produced exactly once, at investigation termination.

use serde::{Deserialize, Serialize};

/// Phrases in a synthesis report that indicate material findings.
const FRAUD_KEYWORDS: [&str; 5] = [
    "fraud detected",
    "suspicious",
    "inconsistency",
    "discrepancy",
    "manipulation",
];

/// Risk tier — a deterministic monotone function of confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Map a confidence in [0, 1] onto a tier.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::Critical
        } else if confidence >= 0.6 {
            Self::High
        } else if confidence >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured end product of an investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    pub fraud_detected: bool,

    /// Overall confidence, within [0, 1].
    pub confidence: f64,

    pub risk: RiskTier,

    pub fraud_indicators: Vec<String>,

    pub evidence: Vec<String>,

    pub recommended_actions: Vec<String>,

    /// The synthesis report text.
    pub summary: String,
}

impl FraudAssessment {
    /// Build an assessment from a synthesis report plus accumulated state.
    ///
    /// `fraud_detected` is a keyword scan over the report; the tier follows
    /// the confidence mapping.
    pub fn from_synthesis(
        summary: impl Into<String>,
        confidence: f64,
        fraud_indicators: Vec<String>,
        evidence: Vec<String>,
    ) -> Self {
        let summary = summary.into();
        let lower = summary.to_lowercase();
        let fraud_detected = FRAUD_KEYWORDS.iter().any(|kw| lower.contains(kw));
        let confidence = confidence.clamp(0.0, 1.0);

        Self {
            fraud_detected,
            confidence,
            risk: RiskTier::from_confidence(confidence),
            fraud_indicators,
            evidence,
            recommended_actions: vec![
                "Review findings".into(),
                "Conduct manual verification".into(),
            ],
            summary,
        }
    }

    /// Degraded assessment used when the synthesis call itself fails.
    pub fn fallback(error: impl std::fmt::Display) -> Self {
        Self {
            fraud_detected: false,
            confidence: 0.0,
            risk: RiskTier::Low,
            fraud_indicators: vec![],
            evidence: vec![],
            recommended_actions: vec!["Manual review required due to analysis error".into()],
            summary: format!("Analysis incomplete due to error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mapping_is_monotone() {
        assert_eq!(RiskTier::from_confidence(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_confidence(0.39), RiskTier::Low);
        assert_eq!(RiskTier::from_confidence(0.4), RiskTier::Medium);
        assert_eq!(RiskTier::from_confidence(0.6), RiskTier::High);
        assert_eq!(RiskTier::from_confidence(0.8), RiskTier::Critical);
        assert_eq!(RiskTier::from_confidence(1.0), RiskTier::Critical);

        let mut last = RiskTier::Low;
        for i in 0..=100 {
            let tier = RiskTier::from_confidence(i as f64 / 100.0);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn keyword_scan_sets_detection() {
        let hit = FraudAssessment::from_synthesis(
            "Weight discrepancy between invoice and packing list",
            0.75,
            vec![],
            vec![],
        );
        assert!(hit.fraud_detected);
        assert_eq!(hit.risk, RiskTier::High);

        let miss =
            FraudAssessment::from_synthesis("All cross-checks passed cleanly", 0.2, vec![], vec![]);
        assert!(!miss.fraud_detected);
        assert_eq!(miss.risk, RiskTier::Low);
    }

    #[test]
    fn confidence_is_clamped() {
        let a = FraudAssessment::from_synthesis("ok", 1.7, vec![], vec![]);
        assert_eq!(a.confidence, 1.0);
        let b = FraudAssessment::from_synthesis("ok", -0.3, vec![], vec![]);
        assert_eq!(b.confidence, 0.0);
    }

    #[test]
    fn fallback_is_low_risk_not_detected() {
        let a = FraudAssessment::fallback("reasoning capability unreachable");
        assert!(!a.fraud_detected);
        assert_eq!(a.confidence, 0.0);
        assert_eq!(a.risk, RiskTier::Low);
        assert!(a.summary.contains("unreachable"));
    }

    #[test]
    fn tier_serializes_screaming() {
        let json = serde_json::to_string(&RiskTier::Critical).unwrap();
        assert_eq!(json, r#""CRITICAL""#);
    }
}
