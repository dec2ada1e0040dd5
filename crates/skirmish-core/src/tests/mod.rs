//! Scenario, determinism and property tests for the full resolver.
//!
//! - `integration.rs`: end-to-end scenarios through [`CombatResolver::step`]
//! - `determinism.rs`: identical inputs give identical event streams
//! - `properties.rs`: `proptest` properties over arbitrary inputs
//! - `helpers.rs`: arena setup and event inspection
//!
//! [`CombatResolver::step`]: crate::resolver::CombatResolver::step

mod helpers;

// Re-export for convenience
pub use helpers::*;
