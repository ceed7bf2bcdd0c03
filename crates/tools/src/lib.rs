//! Built-in investigation tool implementations for fraudhound.
//!
//! Each tool is a named unit of work over a document bundle snapshot,
//! returning a plain-text finding for the audit trail. The checks here are
//! deliberately lightweight, dependency-free scanners — deep document
//! analytics belong to external collaborators, not this crate.

pub mod numeric;
pub mod quantity_consistency;
pub mod round_numbers;
pub mod synthesis;
pub mod weight_consistency;

use fraudhound_core::tool::ToolRegistry;

/// Create the default tool registry with all built-in tools.
///
/// The synthesis tool is always present — it is the terminal action every
/// investigation falls back to and ends with.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(quantity_consistency::QuantityConsistencyTool));
    registry.register(Box::new(weight_consistency::WeightConsistencyTool));
    registry.register(Box::new(round_numbers::RoundNumberPatternTool));
    registry.register(Box::new(synthesis::EvidenceSynthesisTool));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudhound_core::tool::ToolId;

    #[test]
    fn default_registry_has_synthesis() {
        let registry = default_registry();
        assert!(registry.contains(ToolId::SynthesizeFraudEvidence));
        assert!(registry.contains(ToolId::ValidateQuantityConsistency));
        assert!(registry.contains(ToolId::ValidateWeightConsistency));
        assert!(registry.contains(ToolId::DetectRoundNumberPatterns));
        assert_eq!(registry.ids().len(), 4);
    }
}
