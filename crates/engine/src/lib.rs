//! The investigation loop — the heart of fraudhound.
//!
//! An investigation follows an **Observe → Think → Act** cycle:
//!
//! 1. **Observe** — snapshot the corpus and accumulated state
//! 2. **Think** — ask the reasoning capability for the next step
//! 3. **Act** — dispatch the recommended tool and record the result
//!
//! The cycle repeats under a bounded iteration budget until a termination
//! condition holds, then one final synthesis call produces the structured
//! assessment. Every step lands in an append-only execution trace; a
//! streaming sink mirrors progress to consumers without ever blocking the
//! loop.

pub mod action;
pub mod controller;
pub mod memory;
pub mod observation;
pub mod reasoning;
pub mod service;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use action::{Action, Dispatcher};
pub use controller::InvestigationLoop;
pub use memory::ExecutionMemory;
pub use observation::{Observation, Observer};
pub use reasoning::{Reasoning, ReasoningKind, Thinker};
pub use service::{InvestigationOptions, InvestigationService};
pub use stream::{EventSink, InvestigationStreamEvent};
