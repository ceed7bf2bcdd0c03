//! # Fraudhound Core
//!
//! Domain types, traits, and error definitions for the fraudhound
//! investigation engine. This crate has **zero framework dependencies** —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod assessment;
pub mod capability;
pub mod document;
pub mod error;
pub mod execution;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use assessment::{FraudAssessment, RiskTier};
pub use capability::{Classify, Reason};
pub use document::{Document, DocumentBundle, DocumentKind};
pub use error::{CapabilityError, EngineError, Error, Result, ToolError};
pub use execution::{ExecutionState, ExecutionStatus, Step, StepKind};
pub use tool::{InvestigationTool, ToolId, ToolRegistry};
