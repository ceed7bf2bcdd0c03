//! Investigation tool abstraction and typed registry.
//!
//! Tools are the named units of work the action dispatcher can execute
//! against a document bundle. Dispatch is keyed by [`ToolId`] — a closed
//! enum — rather than free strings: an unrecognized recommendation resolves
//! to the synthesis tool instead of surfacing as a runtime surprise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::DocumentBundle;
use crate::error::ToolError;

/// The closed vocabulary of tool identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    ValidateQuantityConsistency,
    ValidateWeightConsistency,
    ValidateEntityConsistency,
    ValidateProductDescriptions,
    ValidateValueConsistency,
    ValidateGeographicConsistency,
    ValidateUnitCalculations,
    ValidateWeightRatios,
    ValidatePackageCalculations,
    DetectRoundNumberPatterns,
    DetectProductSubstitution,
    DetectOriginManipulation,
    DetectEntityVariations,
    SynthesizeFraudEvidence,
}

impl ToolId {
    /// The canonical wire name for this tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateQuantityConsistency => "validate_quantity_consistency",
            Self::ValidateWeightConsistency => "validate_weight_consistency",
            Self::ValidateEntityConsistency => "validate_entity_consistency",
            Self::ValidateProductDescriptions => "validate_product_descriptions",
            Self::ValidateValueConsistency => "validate_value_consistency",
            Self::ValidateGeographicConsistency => "validate_geographic_consistency",
            Self::ValidateUnitCalculations => "validate_unit_calculations",
            Self::ValidateWeightRatios => "validate_weight_ratios",
            Self::ValidatePackageCalculations => "validate_package_calculations",
            Self::DetectRoundNumberPatterns => "detect_round_number_patterns",
            Self::DetectProductSubstitution => "detect_product_substitution",
            Self::DetectOriginManipulation => "detect_origin_manipulation",
            Self::DetectEntityVariations => "detect_entity_variations",
            Self::SynthesizeFraudEvidence => "synthesize_fraud_evidence",
        }
    }

    /// Strict parse of a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        let id = match name.trim() {
            "validate_quantity_consistency" => Self::ValidateQuantityConsistency,
            "validate_weight_consistency" => Self::ValidateWeightConsistency,
            "validate_entity_consistency" => Self::ValidateEntityConsistency,
            "validate_product_descriptions" => Self::ValidateProductDescriptions,
            "validate_value_consistency" => Self::ValidateValueConsistency,
            "validate_geographic_consistency" => Self::ValidateGeographicConsistency,
            "validate_unit_calculations" => Self::ValidateUnitCalculations,
            "validate_weight_ratios" => Self::ValidateWeightRatios,
            "validate_package_calculations" => Self::ValidatePackageCalculations,
            "detect_round_number_patterns" => Self::DetectRoundNumberPatterns,
            "detect_product_substitution" => Self::DetectProductSubstitution,
            "detect_origin_manipulation" => Self::DetectOriginManipulation,
            "detect_entity_variations" => Self::DetectEntityVariations,
            "synthesize_fraud_evidence" => Self::SynthesizeFraudEvidence,
            _ => return None,
        };
        Some(id)
    }

    /// Lenient resolution for recommendations coming out of free text:
    /// unknown names fall back to the terminal synthesis tool.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::SynthesizeFraudEvidence)
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The core tool trait.
///
/// Each tool inspects a (read-only) document bundle snapshot and returns a
/// plain-text finding. Structured options are tool-specific JSON.
#[async_trait]
pub trait InvestigationTool: Send + Sync {
    /// The identity of this tool within the closed vocabulary.
    fn id(&self) -> ToolId;

    /// A description of what this tool checks (surfaced to the reasoner).
    fn describe(&self) -> &str;

    /// Execute against a bundle snapshot.
    async fn execute(
        &self,
        bundle: &DocumentBundle,
        options: &serde_json::Value,
    ) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools, keyed by [`ToolId`].
///
/// The action dispatcher uses this to look up and execute the tool a
/// reasoning step recommended. Registration is validated implicitly by the
/// type system: the key is always the tool's own id.
pub struct ToolRegistry {
    tools: HashMap<ToolId, Box<dyn InvestigationTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same id.
    pub fn register(&mut self, tool: Box<dyn InvestigationTool>) {
        self.tools.insert(tool.id(), tool);
    }

    /// Get a tool by id.
    pub fn get(&self, id: ToolId) -> Option<&dyn InvestigationTool> {
        self.tools.get(&id).map(|t| t.as_ref())
    }

    /// Whether this id has a registered implementation.
    pub fn contains(&self, id: ToolId) -> bool {
        self.tools.contains_key(&id)
    }

    /// All registered tool ids, sorted by wire name for stable output.
    pub fn ids(&self) -> Vec<ToolId> {
        let mut ids: Vec<ToolId> = self.tools.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    /// `(id, description)` pairs for surfacing to the reasoner.
    pub fn descriptions(&self) -> Vec<(ToolId, String)> {
        self.ids()
            .into_iter()
            .map(|id| (id, self.tools[&id].describe().to_string()))
            .collect()
    }

    /// Execute a tool by id.
    pub async fn execute(
        &self,
        id: ToolId,
        bundle: &DocumentBundle,
        options: &serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        let tool = self
            .tools
            .get(&id)
            .ok_or_else(|| ToolError::NotRegistered(id.as_str().into()))?;
        tool.execute(bundle, options).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl InvestigationTool for EchoTool {
        fn id(&self) -> ToolId {
            ToolId::SynthesizeFraudEvidence
        }
        fn describe(&self) -> &str {
            "Echoes the bundle id"
        }
        async fn execute(
            &self,
            bundle: &DocumentBundle,
            _options: &serde_json::Value,
        ) -> std::result::Result<String, ToolError> {
            Ok(bundle.bundle_id.clone())
        }
    }

    #[test]
    fn tool_id_round_trip() {
        for name in [
            "validate_quantity_consistency",
            "detect_round_number_patterns",
            "synthesize_fraud_evidence",
        ] {
            assert_eq!(ToolId::from_name(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn unknown_name_resolves_to_synthesis() {
        assert_eq!(ToolId::resolve("not_a_tool"), ToolId::SynthesizeFraudEvidence);
        assert_eq!(ToolId::resolve(""), ToolId::SynthesizeFraudEvidence);
        assert_eq!(
            ToolId::resolve(" validate_weight_consistency "),
            ToolId::ValidateWeightConsistency
        );
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.contains(ToolId::SynthesizeFraudEvidence));
        assert!(!registry.contains(ToolId::ValidateWeightRatios));
        assert_eq!(registry.ids(), vec![ToolId::SynthesizeFraudEvidence]);
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let bundle = DocumentBundle::new("b1", vec![Document::untyped("a.txt", "x")]);
        let out = registry
            .execute(
                ToolId::SynthesizeFraudEvidence,
                &bundle,
                &serde_json::Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(out, "b1");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let bundle = DocumentBundle::new("b1", vec![]);
        let err = registry
            .execute(
                ToolId::ValidateValueConsistency,
                &bundle,
                &serde_json::Value::Null,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotRegistered(_)));
    }
}
