//! UX review tools exposed to the model.
//!
//! These are plain functions over their arguments. The agent loop knows
//! nothing about them beyond their [`ToolSpec`](crate::agent::ToolSpec).

pub mod ab_tests;
pub mod heuristics;
pub mod readability;

use crate::agent::ToolRegistry;
use crate::error::RegistryError;

/// Register every UX tool, in catalog order.
pub fn register_ux_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register_typed(readability::spec(), readability::compute_readability)?;
    registry.register_typed(heuristics::spec(), heuristics::score_usability_heuristics)?;
    registry.register_typed(ab_tests::spec(), ab_tests::suggest_ab_tests)?;
    Ok(())
}

/// A registry holding just the UX tools.
pub fn ux_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_ux_tools(&mut registry)?;
    Ok(registry)
}
